use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub name: String,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub subject_id: Option<Uuid>,
    /// Teacher who delivers (and owns) the lesson.
    pub teacher_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLessonDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub class_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLessonDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub class_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct LessonListParams {
    /// Case-insensitive substring match on the lesson name.
    pub search: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit class filter.
    pub classid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LessonListResponse {
    pub data: Vec<Lesson>,
    pub total: i64,
}
