use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Storage key of the school logo, if one was uploaded.
    pub logo: Option<String>,
    /// Prefix used when generating student admission numbers.
    pub admission_prefix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_admission_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("admission_prefix")
            .with_message("admission prefix must be alphanumeric".into()))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolDto {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(
        length(min = 2, max = 10),
        custom(function = validate_admission_prefix)
    )]
    pub admission_prefix: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolDto {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(
        length(min = 2, max = 10),
        custom(function = validate_admission_prefix)
    )]
    pub admission_prefix: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SchoolListParams {
    /// Case-insensitive substring match on the school name.
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolListResponse {
    pub data: Vec<School>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_prefix_must_be_alphanumeric() {
        let dto = CreateSchoolDto {
            name: "Hallmark College".to_string(),
            address: None,
            phone: None,
            email: None,
            admission_prefix: "HALL".to_string(),
        };
        assert!(dto.validate().is_ok());

        let dto = CreateSchoolDto {
            admission_prefix: "HA/LL".to_string(),
            ..dto
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_admission_prefix_length_bounds() {
        let base = CreateSchoolDto {
            name: "Hallmark College".to_string(),
            address: None,
            phone: None,
            email: None,
            admission_prefix: "H".to_string(),
        };
        assert!(base.validate().is_err());
    }
}
