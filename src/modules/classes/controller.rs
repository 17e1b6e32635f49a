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
    Class, ClassListParams, ClassListResponse, ClassWithStats, CreateClassDto, UpdateClassDto,
};
use super::service::ClassService;

#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassListParams),
    responses(
        (status = 200, description = "Classes in scope", body = ClassListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ClassListParams>,
) -> Result<Json<ClassListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = ClassService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = ClassWithStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassWithStats>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let class = ClassService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Class already exists")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let class = ClassService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let class = ClassService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes",
    params(BatchDeleteParams),
    responses(
        (status = 200, description = "Delete report", body = DeleteReport),
        (status = 400, description = "Invalid ids"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchDeleteParams>,
) -> Result<Json<DeleteReport>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let ids = parse_id_list(&params.ids)?;
    let report = ClassService::delete_many(&state.db, &ctx, ids).await?;
    Ok(Json(report))
}
