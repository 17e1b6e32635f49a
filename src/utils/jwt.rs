use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use scolara_core::{AppError, Role};

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;

pub fn create_access_token(
    principal_id: Uuid,
    role: Role,
    school_id: Option<Uuid>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: principal_id.to_string(),
        role: role.as_str().to_string(),
        school_id,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthenticated(anyhow::anyhow!("Invalid or expired token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let config = test_config();
        let id = Uuid::new_v4();
        let school = Uuid::new_v4();

        let token = create_access_token(id, Role::Admin, Some(school), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.school_id, Some(school));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let token = create_access_token(Uuid::new_v4(), Role::Super, None, &config).unwrap();

        let other = JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expiry: 3600,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(verify_token("not.a.token", &test_config()).is_err());
    }
}
