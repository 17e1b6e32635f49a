use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, DeleteReport};

use crate::middleware::auth::AuthUser;
use crate::middleware::context::load_caller_context;
use crate::state::AppState;
use crate::utils::authz::{BatchDeleteParams, parse_id_list};
use crate::validator::ValidatedJson;

use super::model::{
    CreateTeacherDto, Teacher, TeacherListParams, TeacherListResponse, UpdateTeacherDto,
};
use super::service::TeacherService;

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherListParams),
    responses(
        (status = 200, description = "Teachers in scope", body = TeacherListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<TeacherListParams>,
) -> Result<Json<TeacherListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = TeacherService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let teacher = TeacherService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username or email already exists")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let teacher = TeacherService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let teacher = TeacherService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers",
    params(BatchDeleteParams),
    responses(
        (status = 200, description = "Delete report", body = DeleteReport),
        (status = 400, description = "Invalid ids"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchDeleteParams>,
) -> Result<Json<DeleteReport>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let ids = parse_id_list(&params.ids)?;
    let report = TeacherService::delete_many(&state.db, &ctx, ids).await?;
    Ok(Json(report))
}
