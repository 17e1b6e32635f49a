use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use scolara_core::{AppError, FileStorage};

use crate::middleware::auth::AuthUser;
use crate::middleware::context::load_caller_context;
use crate::state::AppState;
use crate::utils::upload::read_image_upload;

use super::model::{
    GalleryItem, GalleryItemResponse, GalleryListParams, GalleryListResponse, GalleryUploadParams,
};
use super::service::GalleryService;

fn to_response(
    storage: &dyn FileStorage,
    item: GalleryItem,
) -> Result<GalleryItemResponse, AppError> {
    let url = storage
        .get_url(&item.image_key)
        .map_err(|e| AppError::internal(anyhow::anyhow!(e.to_string())))?;
    Ok(GalleryItemResponse {
        id: item.id,
        title: item.title,
        url,
        school_id: item.school_id,
        created_at: item.created_at,
    })
}

#[utoipa::path(
    get,
    path = "/api/gallery",
    params(GalleryListParams),
    responses(
        (status = 200, description = "Gallery items in scope", body = GalleryListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Gallery",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<GalleryListParams>,
) -> Result<Json<GalleryListResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let (items, total) = GalleryService::list(&state.db, &ctx, &params).await?;

    let data = items
        .into_iter()
        .map(|item| to_response(state.file_storage.as_ref(), item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(GalleryListResponse { data, total }))
}

#[utoipa::path(
    get,
    path = "/api/gallery/{id}",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Gallery item", body = GalleryItemResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Gallery item not found")
    ),
    tag = "Gallery",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_gallery_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GalleryItemResponse>, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let item = GalleryService::get_by_id(&state.db, &ctx, id).await?;
    Ok(Json(to_response(state.file_storage.as_ref(), item)?))
}

#[utoipa::path(
    post,
    path = "/api/gallery",
    params(GalleryUploadParams),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = GalleryItemResponse),
        (status = 400, description = "Invalid image"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Gallery",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_gallery_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<GalleryUploadParams>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<GalleryItemResponse>), AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    let upload = read_image_upload(&mut multipart).await?;

    let item = GalleryService::upload(
        &state.db,
        state.file_storage.as_ref(),
        &ctx,
        params.schoolid,
        upload.title,
        &upload.mime_type,
        &upload.content,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(to_response(state.file_storage.as_ref(), item)?),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 204, description = "Gallery item deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Gallery item not found")
    ),
    tag = "Gallery",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_caller_context(&state.db, &auth_user).await?;
    GalleryService::delete(&state.db, state.file_storage.as_ref(), &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
