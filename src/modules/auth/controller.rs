use axum::{Json, extract::State};
use tracing::instrument;

use scolara_core::AppError;

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{ErrorResponse, LoginRequest, LoginResponse};
use super::service::AuthService;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}
