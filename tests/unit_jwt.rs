use uuid::Uuid;

use scolara::config::jwt::JwtConfig;
use scolara::utils::jwt::{create_access_token, verify_token};
use scolara_core::Role;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_create_access_token_success() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(Uuid::new_v4(), Role::Student, None, &jwt_config);

    assert!(token.is_ok());
    assert!(!token.unwrap().is_empty());
}

#[test]
fn test_create_access_token_all_roles() {
    let jwt_config = get_test_jwt_config();
    let roles = [
        Role::Super,
        Role::Management,
        Role::Admin,
        Role::Teacher,
        Role::Student,
        Role::Parent,
    ];

    for role in roles {
        let result = create_access_token(Uuid::new_v4(), role, None, &jwt_config);
        assert!(result.is_ok());
    }
}

#[test]
fn test_verify_token_success() {
    let jwt_config = get_test_jwt_config();
    let principal_id = Uuid::new_v4();
    let school_id = Uuid::new_v4();

    let token =
        create_access_token(principal_id, Role::Teacher, Some(school_id), &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, principal_id.to_string());
    assert_eq!(claims.role, "teacher");
    assert_eq!(claims.school_id, Some(school_id));
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(Uuid::new_v4(), Role::Admin, None, &jwt_config).unwrap();

    let other_config = JwtConfig {
        secret: "a_completely_different_secret".to_string(),
        access_token_expiry: 3600,
    };

    assert!(verify_token(&token, &other_config).is_err());
}

#[test]
fn test_verify_token_malformed() {
    let jwt_config = get_test_jwt_config();
    assert!(verify_token("not.a.valid.token", &jwt_config).is_err());
    assert!(verify_token("", &jwt_config).is_err());
}

#[test]
fn test_verify_rejects_expired_token() {
    let expired_config = JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: -3600,
    };
    let token = create_access_token(Uuid::new_v4(), Role::Student, None, &expired_config).unwrap();

    assert!(verify_token(&token, &expired_config).is_err());
}
