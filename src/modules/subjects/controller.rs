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
    CreateSubjectDto, Subject, SubjectListParams, SubjectListResponse, UpdateSubjectDto,
};
use super::service::SubjectService;

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(SubjectListParams),
    responses(
        (status = 200, description = "Subjects in scope", body = SubjectListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_subjects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<SubjectListParams>,
) -> Result<Json<SubjectListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = SubjectService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject details", body = Subject),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Subject>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let subject = SubjectService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let subject = SubjectService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = Subject),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<Subject>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let subject = SubjectService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    SubjectService::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
