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

use super::model::{CreateEventDto, Event, EventListParams, EventListResponse, UpdateEventDto};
use super::service::EventService;

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventListParams),
    responses(
        (status = 200, description = "Events in scope", body = EventListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<EventListParams>,
) -> Result<Json<EventListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let response = EventService::list(&state.db, &ctx, params).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let event = EventService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let event = EventService::create(&state.db, &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<Event>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let event = EventService::update(&state.db, &ctx, id, dto).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found")
    ),
    tag = "Events",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    EventService::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
