use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    /// Teacher who recorded the grade.
    pub teacher_id: Uuid,
    pub school_id: Uuid,
    pub term: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scored component of a grade (test, assignment, exam).
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GradeComponent {
    pub id: Uuid,
    pub grade_id: Uuid,
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeWithComponents {
    #[serde(flatten)]
    pub grade: Grade,
    pub components: Vec<GradeComponent>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GradeComponentInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub score: f64,
    #[validate(range(min = 0.0))]
    pub max_score: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    /// Required for management/admin callers; teachers always record under
    /// their own id.
    pub teacher_id: Option<Uuid>,
    #[validate(length(min = 1, max = 30))]
    pub term: String,
    #[validate(nested)]
    pub components: Vec<GradeComponentInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(length(min = 1, max = 30))]
    pub term: Option<String>,
    /// When present, replaces the full component set.
    #[validate(nested)]
    pub components: Option<Vec<GradeComponentInput>>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GradeListParams {
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit student filter.
    pub studentid: Option<Uuid>,
    /// Explicit subject filter.
    pub subjectid: Option<Uuid>,
    pub term: Option<String>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeListResponse {
    pub data: Vec<Grade>,
    pub total: i64,
}
