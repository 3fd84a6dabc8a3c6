pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Directory
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list_resumes).post(handlers::handle_create_resume),
        )
        .route("/api/v1/resumes/facets", get(handlers::handle_facets))
        .route("/api/v1/resumes/current", get(handlers::handle_current_resume))
        // Single record
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume).delete(handlers::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/sections/:section",
            put(handlers::handle_update_section),
        )
        .with_state(state)
}
