use scolara_core::{DEFAULT_PASSWORD, hash_password, verify_password};

#[test]
fn test_hash_password_success() {
    let password = "testpassword123";
    let result = hash_password(password);

    assert!(result.is_ok());
    let hash = result.unwrap();
    assert!(!hash.is_empty());
    assert_ne!(hash, password);
}

#[test]
fn test_verify_password_correct() {
    let password = "correctpassword";
    let hash = hash_password(password).unwrap();

    assert!(verify_password(password, &hash).unwrap());
}

#[test]
fn test_verify_password_incorrect() {
    let hash = hash_password("correctpassword").unwrap();

    assert!(!verify_password("wrongpassword", &hash).unwrap());
}

#[test]
fn test_verify_password_invalid_hash() {
    assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
}

#[test]
fn test_hashes_are_salted() {
    let first = hash_password("samepassword").unwrap();
    let second = hash_password("samepassword").unwrap();

    assert_ne!(first, second);
    assert!(verify_password("samepassword", &first).unwrap());
    assert!(verify_password("samepassword", &second).unwrap());
}

#[test]
fn test_default_password_round_trips() {
    let hash = hash_password(DEFAULT_PASSWORD).unwrap();
    assert!(verify_password(DEFAULT_PASSWORD, &hash).unwrap());
}
