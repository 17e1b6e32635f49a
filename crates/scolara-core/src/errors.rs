//! Application error type with HTTP response conversion.
//!
//! Every handler returns `Result<_, AppError>` and catches at its own
//! boundary; no error crosses a request. The status mapping is uniform:
//!
//! | Failure | Status |
//! |---------|--------|
//! | Malformed/invalid input, guarded delete | 400 |
//! | Missing or invalid session | 401 |
//! | Authenticated but insufficient privilege or out-of-scope write | 403 |
//! | Target row absent or outside the caller's read scope | 404 |
//! | Uniqueness violation | 409 |
//! | Unexpected failure | 500 (generic message, original logged) |

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            details: None,
        }
    }

    /// Attach field-level or guard-level detail to the error body.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthenticated<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal details never reach the client; they only go to the log.
        let message = if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.error, "Internal server error");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = match self.details {
            Some(details) => Json(json!({ "error": message, "details": details })),
            None => Json(json!({ "error": message })),
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request(anyhow::anyhow!("bad")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthenticated(anyhow::anyhow!("no session")).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden(anyhow::anyhow!("nope")).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("missing")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict(anyhow::anyhow!("duplicate")).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_from_any_error_is_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_with_details() {
        let err = AppError::bad_request(anyhow::anyhow!("blocked"))
            .with_details(json!([{ "id": "x", "reason": "has students" }]));
        assert!(err.details.is_some());
    }
}
