use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_parent, delete_parents, get_parent, list_parents, update_parent,
};

pub fn init_parents_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_parents).post(create_parent).delete(delete_parents),
        )
        .route("/{id}", get(get_parent).put(update_parent))
}
