pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::applications::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        // Public application form
        .route(
            "/api/submit",
            post(handlers::handle_submit)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        // Admin dashboard API
        .route(
            "/api/applications",
            get(handlers::handle_list_applications).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/applications/:id/resume",
            get(handlers::handle_get_resume).fallback(handlers::method_not_allowed),
        )
        // Everything else is the static site
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
