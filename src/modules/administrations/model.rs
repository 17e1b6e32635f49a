use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// An administrative staff record. The password column never appears in a
/// SELECT projection.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Administration {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// `management` or `admin`; `super` rows exist but are created from the
    /// CLI and carry no school association.
    pub role: String,
    pub school_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Roles assignable through the API.
fn validate_staff_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "management" | "admin" => Ok(()),
        _ => Err(ValidationError::new("role")
            .with_message("role must be 'management' or 'admin'".into())),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdministrationDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Defaults to the placeholder password when absent.
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(custom(function = validate_staff_role))]
    pub role: String,
    /// Required for super callers; scoped callers default to their own
    /// school.
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAdministrationDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(custom(function = validate_staff_role))]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AdministrationListParams {
    /// Case-insensitive substring match on name, username, and email.
    pub search: Option<String>,
    /// Explicit role filter (`management` or `admin`).
    pub role: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdministrationListResponse {
    pub data: Vec<Administration>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(role: &str) -> CreateAdministrationDto {
        CreateAdministrationDto {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            username: "ada.obi".to_string(),
            email: "ada@example.com".to_string(),
            password: None,
            role: role.to_string(),
            school_id: None,
        }
    }

    #[test]
    fn test_role_must_be_assignable() {
        assert!(dto("management").validate().is_ok());
        assert!(dto("admin").validate().is_ok());
        assert!(dto("super").validate().is_err());
        assert!(dto("teacher").validate().is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let mut d = dto("admin");
        d.password = Some("short".to_string());
        assert!(d.validate().is_err());
    }
}
