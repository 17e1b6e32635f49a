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
    CreateLessonDto, Lesson, LessonListParams, LessonListResponse, UpdateLessonDto,
};
use super::service::LessonService;

#[utoipa::path(
    get,
    path = "/api/lessons",
    params(LessonListParams),
    responses(
        (status = 200, description = "Lessons in scope", body = LessonListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_lessons(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<LessonListParams>,
) -> Result<Json<LessonListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = LessonService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson details", body = Lesson),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lesson not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Lesson>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let lesson = LessonService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(lesson))
}

#[utoipa::path(
    post,
    path = "/api/lessons",
    request_body = CreateLessonDto,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateLessonDto>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let lesson = LessonService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

#[utoipa::path(
    put,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = UpdateLessonDto,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Lesson not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateLessonDto>,
) -> Result<Json<Lesson>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let lesson = LessonService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(lesson))
}

#[utoipa::path(
    delete,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Lesson not found")
    ),
    tag = "Lessons",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    LessonService::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
