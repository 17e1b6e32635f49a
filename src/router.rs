use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::modules::administrations::router::init_administrations_router;
use crate::modules::announcements::router::init_announcements_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::classes::router::init_classes_router;
use crate::modules::events::router::init_events_router;
use crate::modules::gallery::router::init_gallery_router;
use crate::modules::grades::router::init_grades_router;
use crate::modules::lessons::router::init_lessons_router;
use crate::modules::parents::router::init_parents_router;
use crate::modules::schools::router::init_schools_router;
use crate::modules::students::router::init_students_router;
use crate::modules::subjects::router::init_subjects_router;
use crate::modules::teachers::router::init_teachers_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/schools", init_schools_router())
                .nest("/administrations", init_administrations_router())
                .nest("/teachers", init_teachers_router())
                .nest("/students", init_students_router())
                .nest("/parents", init_parents_router())
                .nest("/classes", init_classes_router())
                .nest("/subjects", init_subjects_router())
                .nest("/lessons", init_lessons_router())
                .nest("/grades", init_grades_router())
                .nest("/announcements", init_announcements_router())
                .nest("/events", init_events_router())
                .nest("/gallery", init_gallery_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
