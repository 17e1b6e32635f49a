use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    delete_gallery_item, get_gallery_item, list_gallery, upload_gallery_item,
};

pub fn init_gallery_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_gallery).post(upload_gallery_item))
        .route("/{id}", get(get_gallery_item).delete(delete_gallery_item))
}
