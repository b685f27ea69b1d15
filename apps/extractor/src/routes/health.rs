use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Service banner.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "Page Extractor",
        "version": env!("CARGO_PKG_VERSION"),
        "architecture": "Crawl-then-Extract (2-phase)",
        "status": "running"
    }))
}

/// GET /health
/// Liveness plus whether phase 2 can run.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "extractor",
        "llm_configured": state.config.llm_configured()
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{get_json, test_state, StaticEngine};

    #[tokio::test]
    async fn test_root_banner() {
        let (status, body) = get_json(test_state(StaticEngine::page(""), None), "/").await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "running");
        assert_eq!(body["architecture"], "Crawl-then-Extract (2-phase)");
    }

    #[tokio::test]
    async fn test_health_reports_llm_configuration() {
        let (_, body) = get_json(test_state(StaticEngine::page(""), None), "/health").await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["llm_configured"], false);

        let (_, body) = get_json(
            test_state(StaticEngine::page(""), Some("http://127.0.0.1:9")),
            "/health",
        )
        .await;
        assert_eq!(body["llm_configured"], true);
    }
}
