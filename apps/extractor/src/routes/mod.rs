pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::crawl::handlers::handle_extract;
use crate::pipeline::handlers::{handle_extract_cv, handle_extract_job};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Two-phase extraction
        .route("/extract-cv", post(handle_extract_cv))
        .route("/extract-job", post(handle_extract_job))
        // Crawl only
        .route("/extract", post(handle_extract))
        .with_state(state)
}
