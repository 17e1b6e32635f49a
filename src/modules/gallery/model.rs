use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: Option<String>,
    /// Storage key of the image; not directly fetchable by clients.
    pub image_key: String,
    pub school_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Gallery item as returned to clients, with the public image URL resolved
/// from the storage key.
#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryItemResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub url: String,
    pub school_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GalleryListParams {
    /// Explicit school filter, mainly for super callers.
    pub schoolid: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: scolara_core::PaginationParams,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct GalleryUploadParams {
    /// Target school for super callers uploading on behalf of a school.
    pub schoolid: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryListResponse {
    pub data: Vec<GalleryItemResponse>,
    pub total: i64,
}
