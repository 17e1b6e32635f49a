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
    CreateGradeDto, GradeListParams, GradeListResponse, GradeWithComponents, UpdateGradeDto,
};
use super::service::GradeService;

#[utoipa::path(
    get,
    path = "/api/grades",
    params(GradeListParams),
    responses(
        (status = 200, description = "Grades in scope", body = GradeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<GradeListParams>,
) -> Result<Json<GradeListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = GradeService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade with its components", body = GradeWithComponents),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GradeWithComponents>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let grade = GradeService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = GradeWithComponents),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<GradeWithComponents>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let grade = GradeService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = GradeWithComponents),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<GradeWithComponents>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let grade = GradeService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade and its components deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Grade not found")
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    GradeService::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
