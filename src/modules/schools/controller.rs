use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, Role};

use crate::middleware::auth::AuthUser;
use crate::middleware::context::load_caller_context;
use crate::state::AppState;
use crate::utils::upload::read_image_upload;
use crate::validator::ValidatedJson;

use super::model::{CreateSchoolDto, School, SchoolListParams, SchoolListResponse, UpdateSchoolDto};
use super::service::SchoolService;

#[utoipa::path(
    get,
    path = "/api/schools",
    params(SchoolListParams),
    responses(
        (status = 200, description = "List of schools in scope", body = SchoolListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_schools(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<SchoolListParams>,
) -> Result<Json<SchoolListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = SchoolService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "School details", body = School),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let school = SchoolService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(school))
}

#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = CreateSchoolDto,
    responses(
        (status = 201, description = "School created", body = School),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "School already exists")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSchoolDto>,
) -> Result<(StatusCode, Json<School>), AppError> {
    auth_user.require_any_role(&[Role::Super])?;
    let school = SchoolService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

#[utoipa::path(
    put,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    request_body = UpdateSchoolDto,
    responses(
        (status = 200, description = "School updated", body = School),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSchoolDto>,
) -> Result<Json<School>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let school = SchoolService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(school))
}

#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 204, description = "School deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_any_role(&[Role::Super])?;
    SchoolService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/schools/{id}/logo",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "Logo uploaded", body = School),
        (status = 400, description = "Invalid file"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_school_logo(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<School>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let upload = read_image_upload(&mut multipart).await?;
    let school = SchoolService::upload_logo(
        &state.db,
        state.file_storage.as_ref(),
        &ctx,
        id,
        &upload.mime_type,
        &upload.content,
    )
    .await?;
    Ok(Json(school))
}

#[utoipa::path(
    delete,
    path = "/api/schools/{id}/logo",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "Logo removed", body = School),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_school_logo(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let school =
        SchoolService::delete_logo(&state.db, state.file_storage.as_ref(), &ctx, id).await?;
    Ok(Json(school))
}
