//! Small database error-mapping helpers shared by the services.

use scolara_core::AppError;

/// Map a unique-constraint violation to 409 with the given message; anything
/// else becomes an internal error.
pub fn conflict_on_unique(err: sqlx::Error, message: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow::anyhow!(message));
    }
    AppError::from(err)
}
