use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_grade, delete_grade, get_grade, list_grades, update_grade};

pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_grades).post(create_grade))
        .route(
            "/{id}",
            get(get_grade).put(update_grade).delete(delete_grade),
        )
}
