use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// JWT claims: caller id, role string, and primary school association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// The authenticated principal, role included, password never present.
#[derive(Debug, Serialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub principal: Principal,
}

/// Standard error body shape for API documentation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_requires_fields() {
        let empty = LoginRequest {
            username: "".to_string(),
            password: "".to_string(),
        };
        assert!(empty.validate().is_err());

        let ok = LoginRequest {
            username: "jdoe".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_principal_never_serializes_password() {
        let principal = Principal {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            role: "teacher".to_string(),
            school_id: None,
        };
        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("password"));
    }
}
