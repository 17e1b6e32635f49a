use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_school, delete_school, delete_school_logo, get_school, list_schools, update_school,
    upload_school_logo,
};

pub fn init_schools_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schools).post(create_school))
        .route(
            "/{id}",
            get(get_school).put(update_school).delete(delete_school),
        )
        .route(
            "/{id}/logo",
            post(upload_school_logo).delete(delete_school_logo),
        )
}
