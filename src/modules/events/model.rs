use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub school_id: Uuid,
    /// Target class. NULL addresses the whole school.
    pub class_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct EventListParams {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit class filter.
    pub classid: Option<Uuid>,
    /// Only events starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only events starting at or before this instant.
    pub to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    pub data: Vec<Event>,
    pub total: i64,
}
