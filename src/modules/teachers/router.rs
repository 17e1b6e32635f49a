use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_teacher, delete_teachers, get_teacher, list_teachers, update_teacher,
};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_teachers).post(create_teacher).delete(delete_teachers),
        )
        .route("/{id}", get(get_teacher).put(update_teacher))
}
