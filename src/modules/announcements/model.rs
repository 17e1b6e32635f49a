use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub school_id: Uuid,
    /// Target class. NULL addresses the whole school.
    pub class_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    pub class_id: Option<Uuid>,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub body: Option<String>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AnnouncementListParams {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    /// Explicit class filter.
    pub classid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnnouncementListResponse {
    pub data: Vec<Announcement>,
    pub total: i64,
}
