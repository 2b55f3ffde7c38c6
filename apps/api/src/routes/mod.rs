pub mod health;
pub mod jobs;

use axum::{routing::get, Router};

use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route(
            "/api/v1/recommendations",
            get(handlers::handle_recommendations),
        )
        .with_state(state)
}
