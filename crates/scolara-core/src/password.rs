//! Password hashing and verification.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Placeholder password assigned when a create payload omits one (students
/// and parents created in bulk by school staff). Hashed like any other
/// password; holders are expected to change it on first login.
pub const DEFAULT_PASSWORD: &str = "changeme123";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("s3cret-pass").unwrap();
        assert_ne!(hashed, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_default_password_is_hashable() {
        let hashed = hash_password(DEFAULT_PASSWORD).unwrap();
        assert!(verify_password(DEFAULT_PASSWORD, &hashed).unwrap());
    }
}
