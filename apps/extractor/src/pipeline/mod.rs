// Crawl-then-extract orchestration shared by the CV and job endpoints.
// Phase 1 is mandatory and decides `success`; phase 2 is best-effort and can only
// add structured data or warnings.

pub mod handlers;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::{ExtractionStrategy, StructuredRecord};
use crate::state::AppState;

/// Body accepted by `/extract-cv` and `/extract-job`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
    /// Unset means the endpoint's own default.
    #[serde(default)]
    pub use_llm: Option<bool>,
    #[serde(default)]
    pub bypass_cache: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractionResponse<R> {
    pub success: bool,
    pub url: String,
    pub markdown: String,
    pub structured_data: Option<R>,
    pub metadata: Map<String, Value>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

/// Options resolved by the endpoint before the pipeline runs.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub use_llm: bool,
    pub bypass_cache: bool,
    pub strategy: ExtractionStrategy,
}

/// Runs phase 1 and, when asked, phase 2 for one URL.
///
/// Never fails: a crawl failure comes back as `success = false` and an
/// extraction failure as a warning next to the crawled markdown.
pub async fn run_two_phase<R: StructuredRecord>(
    state: &AppState,
    url: String,
    options: RunOptions,
) -> ExtractionResponse<R> {
    let request_id = Uuid::new_v4();
    info!(%request_id, url = %url, kind = R::KIND, "Starting extraction");

    let crawl = state.crawler.crawl_page(&url, options.bypass_cache).await;
    let crawled_at = Utc::now();

    let mut metadata = Map::new();
    metadata.insert("request_id".into(), json!(request_id));

    if !crawl.success {
        error!(%request_id, error = crawl.error.as_deref().unwrap_or(""), "Phase 1 failed");
        return ExtractionResponse {
            success: false,
            url,
            markdown: String::new(),
            structured_data: None,
            metadata,
            error: crawl.error,
            warnings: Vec::new(),
        };
    }

    let markdown = crawl.text;
    info!(%request_id, chars = markdown.chars().count(), "Phase 1 complete");

    let mut warnings = Vec::new();
    let mut structured_data = None;

    if options.use_llm {
        match state.extractor.extract::<R>(&markdown, options.strategy).await {
            Ok(record) => {
                info!(%request_id, "Phase 2 complete: structured data extracted");
                structured_data = Some(record);
            }
            Err(e) => {
                warn!(%request_id, error = %e, "Phase 2 failed (non-fatal)");
                warnings.push(format!("LLM extraction failed: {e}"));
            }
        }
        metadata.insert("extraction_strategy".into(), json!(options.strategy.as_str()));
    } else {
        info!(%request_id, "Phase 2 skipped (use_llm=false)");
    }

    metadata.insert("markdown_length".into(), json!(markdown.chars().count()));
    metadata.insert("has_structured_data".into(), json!(structured_data.is_some()));
    metadata.insert("llm_attempted".into(), json!(options.use_llm));
    metadata.insert("warnings_count".into(), json!(warnings.len()));
    metadata.insert("title".into(), json!(crawl.title));
    metadata.insert("crawled_at".into(), json!(crawled_at.to_rfc3339()));

    ExtractionResponse {
        success: true,
        url,
        markdown,
        structured_data,
        metadata,
        error: None,
        warnings,
    }
}
