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
    CreateParentDto, Parent, ParentListParams, ParentListResponse, UpdateParentDto,
};
use super::service::ParentService;

#[utoipa::path(
    get,
    path = "/api/parents",
    params(ParentListParams),
    responses(
        (status = 200, description = "Parents in scope", body = ParentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_parents(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ParentListParams>,
) -> Result<Json<ParentListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = ParentService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/parents/{id}",
    params(("id" = Uuid, Path, description = "Parent ID")),
    responses(
        (status = 200, description = "Parent details", body = Parent),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Parent>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let parent = ParentService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(parent))
}

#[utoipa::path(
    post,
    path = "/api/parents",
    request_body = CreateParentDto,
    responses(
        (status = 201, description = "Parent created", body = Parent),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username or email already exists")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateParentDto>,
) -> Result<(StatusCode, Json<Parent>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let parent = ParentService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(parent)))
}

#[utoipa::path(
    put,
    path = "/api/parents/{id}",
    params(("id" = Uuid, Path, description = "Parent ID")),
    request_body = UpdateParentDto,
    responses(
        (status = 200, description = "Parent updated", body = Parent),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Parent not found")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateParentDto>,
) -> Result<Json<Parent>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let parent = ParentService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(parent))
}

#[utoipa::path(
    delete,
    path = "/api/parents",
    params(BatchDeleteParams),
    responses(
        (status = 200, description = "Delete report", body = DeleteReport),
        (status = 400, description = "Invalid ids"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Parents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_parents(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchDeleteParams>,
) -> Result<Json<DeleteReport>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let ids = parse_id_list(&params.ids)?;
    let report = ParentService::delete_many(&state.db, &ctx, ids).await?;
    Ok(Json(report))
}
