use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_administration, delete_administrations, get_administration, list_administrations,
    update_administration,
};

pub fn init_administrations_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_administrations)
                .post(create_administration)
                .delete(delete_administrations),
        )
        .route(
            "/{id}",
            get(get_administration).put(update_administration),
        )
}
