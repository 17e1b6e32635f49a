use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// School-assigned identifier of the form `PREFIX/YEAR/NNNNN`.
    pub admission_number: String,
    pub school_id: Uuid,
    pub class_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Defaults to the placeholder password when absent.
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub school_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub class_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct StudentListParams {
    /// Case-insensitive substring match on name, username, and admission
    /// number.
    pub search: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit class filter.
    pub classid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<Student>,
    pub total: i64,
}
