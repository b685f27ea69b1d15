use std::sync::Arc;

use crate::config::Config;
use crate::crawl::CrawlAdapter;
use crate::extraction::Extractor;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Built once at startup; nothing in here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Phase 1: crawl engine wrapped with the fixed crawl policy.
    pub crawler: CrawlAdapter,
    /// Phase 2: prompt construction, LLM call and reply parsing.
    pub extractor: Extractor,
}
