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
    CreateStudentDto, Student, StudentListParams, StudentListResponse, UpdateStudentDto,
};
use super::service::StudentService;

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentListParams),
    responses(
        (status = 200, description = "Students in scope", body = StudentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<StudentListParams>,
) -> Result<Json<StudentListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = StudentService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let student = StudentService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username or admission number already exists")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let student = StudentService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let student = StudentService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students",
    params(BatchDeleteParams),
    responses(
        (status = 200, description = "Delete report", body = DeleteReport),
        (status = 400, description = "Invalid ids"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchDeleteParams>,
) -> Result<Json<DeleteReport>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let ids = parse_id_list(&params.ids)?;
    let report = StudentService::delete_many(&state.db, &ctx, ids).await?;
    Ok(Json(report))
}
