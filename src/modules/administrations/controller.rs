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
    Administration, AdministrationListParams, AdministrationListResponse, CreateAdministrationDto,
    UpdateAdministrationDto,
};
use super::service::AdministrationService;

#[utoipa::path(
    get,
    path = "/api/administrations",
    params(AdministrationListParams),
    responses(
        (status = 200, description = "Administrators in scope", body = AdministrationListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Administrations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_administrations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AdministrationListParams>,
) -> Result<Json<AdministrationListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = AdministrationService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/administrations/{id}",
    params(("id" = Uuid, Path, description = "Administrator ID")),
    responses(
        (status = 200, description = "Administrator details", body = Administration),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Administrator not found")
    ),
    tag = "Administrations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_administration(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Administration>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let row = AdministrationService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/administrations",
    request_body = CreateAdministrationDto,
    responses(
        (status = 201, description = "Administrator created", body = Administration),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username or email already exists")
    ),
    tag = "Administrations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_administration(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAdministrationDto>,
) -> Result<(StatusCode, Json<Administration>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let row = AdministrationService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    put,
    path = "/api/administrations/{id}",
    params(("id" = Uuid, Path, description = "Administrator ID")),
    request_body = UpdateAdministrationDto,
    responses(
        (status = 200, description = "Administrator updated", body = Administration),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Administrator not found")
    ),
    tag = "Administrations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_administration(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAdministrationDto>,
) -> Result<Json<Administration>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let row = AdministrationService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/administrations",
    params(BatchDeleteParams),
    responses(
        (status = 200, description = "Delete report", body = DeleteReport),
        (status = 400, description = "Invalid ids or self-deletion"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Administrations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_administrations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchDeleteParams>,
) -> Result<Json<DeleteReport>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let ids = parse_id_list(&params.ids)?;
    let report = AdministrationService::delete_many(&state.db, &ctx, ids).await?;
    Ok(Json(report))
}
