//! CLI command for seeding the first unrestricted administrator.
//!
//! Super administrators are never created through the API; this is the only
//! entry point.

use sqlx::PgPool;

use scolara_core::hash_password;

pub async fn create_super_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let result = sqlx::query(
        "INSERT INTO administrations (first_name, last_name, username, email, password, role, school_id) \
         VALUES ($1, $2, $3, $4, $5, 'super', NULL) \
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err("Administrator with this username already exists".into());
    }

    Ok(())
}
