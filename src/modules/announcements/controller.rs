use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::middleware::context::load_caller_context;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    Announcement, AnnouncementListParams, AnnouncementListResponse, CreateAnnouncementDto,
    UpdateAnnouncementDto,
};
use super::service::AnnouncementService;

#[utoipa::path(
    get,
    path = "/api/announcements",
    params(AnnouncementListParams),
    responses(
        (status = 200, description = "Announcements in scope", body = AnnouncementListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AnnouncementListParams>,
) -> Result<Json<AnnouncementListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = AnnouncementService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement details", body = Announcement),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let announcement = AnnouncementService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let announcement = AnnouncementService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<Announcement>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let announcement = AnnouncementService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Announcement not found")
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    AnnouncementService::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
