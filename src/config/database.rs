//! PostgreSQL connection pool initialization.
//!
//! The connection string is read from the `DATABASE_URL` environment
//! variable. The returned pool is cheaply cloneable and lives in
//! [`crate::state::AppState`] for use in request handlers.

use sqlx::PgPool;
use std::env;

/// Initializes a PostgreSQL connection pool.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the connection fails; this runs
/// once at startup and the process cannot serve without a database.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    pool
}
