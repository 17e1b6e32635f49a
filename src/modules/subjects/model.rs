use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub school_id: Uuid,
    /// Class the subject is taught in, when tied to one.
    pub class_id: Option<Uuid>,
    /// Teacher who owns the subject and may grade it.
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub class_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SubjectListParams {
    /// Case-insensitive substring match on the subject name.
    pub search: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit class filter.
    pub classid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectListResponse {
    pub data: Vec<Subject>,
    pub total: i64,
}
