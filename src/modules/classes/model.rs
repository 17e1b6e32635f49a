use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    /// Arm of the class within its year group, e.g. `A` or `Science`.
    pub category: String,
    pub school_id: Uuid,
    pub form_master_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A class with its enrolled-student count, as returned by reads.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassWithStats {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub school_id: Uuid,
    pub form_master_id: Option<Uuid>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub form_master_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub form_master_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ClassListParams {
    /// Case-insensitive substring match on the class name.
    pub search: Option<String>,
    /// Explicit category filter.
    pub category: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassListResponse {
    pub data: Vec<ClassWithStats>,
    pub total: i64,
}
