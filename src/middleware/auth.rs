//! Authentication extractor.
//!
//! [`AuthUser`] validates the bearer token and exposes the caller's claims.
//! A missing or invalid token rejects with 401; role checks against a
//! handler's allow-list reject with 403 (authenticated but insufficient).

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use scolara_core::{AppError, Role};

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::jwt::verify_token;

/// Extractor that validates the JWT and provides the authenticated caller's
/// claims: identity, role, and school association.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The caller's id.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthenticated(anyhow::anyhow!("Invalid user ID in token")))
    }

    /// The caller's typed role. A token carrying an unknown role string is
    /// treated as an invalid session.
    pub fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.0.role)
            .ok_or_else(|| AppError::unauthenticated(anyhow::anyhow!("Invalid role in token")))
    }

    /// The caller's primary school id, if any.
    pub fn school_id(&self) -> Option<Uuid> {
        self.0.school_id
    }

    /// Reject unless the caller's role is in `allowed`.
    pub fn require_any_role(&self, allowed: &[Role]) -> Result<Role, AppError> {
        let role = self.role()?;
        if !allowed.contains(&role) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Access denied - insufficient privileges"
            )));
        }
        Ok(role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthenticated(anyhow::anyhow!("Missing authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthenticated(anyhow::anyhow!("Invalid authorization header format"))
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn auth_user(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            role: role.to_string(),
            school_id: None,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(auth_user("teacher").role().unwrap(), Role::Teacher);
        assert!(auth_user("headmaster").role().is_err());
    }

    #[test]
    fn test_require_any_role_allows_listed() {
        let user = auth_user("management");
        assert!(user.require_any_role(&[Role::Super, Role::Management]).is_ok());
    }

    #[test]
    fn test_require_any_role_rejects_with_403() {
        let user = auth_user("student");
        let err = user
            .require_any_role(&[Role::Super, Role::Management])
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_user_id_rejected() {
        let user = AuthUser(Claims {
            sub: "not-a-uuid".to_string(),
            role: "super".to_string(),
            school_id: None,
            exp: 9999999999,
            iat: 1234567890,
        });
        assert_eq!(user.user_id().unwrap_err().status, StatusCode::UNAUTHORIZED);
    }
}
