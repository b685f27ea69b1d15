//! Axum handler for the crawl-only endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub url: String,
    #[serde(default)]
    pub bypass_cache: bool,
    /// Only return the page's internal links (listing discovery).
    #[serde(default)]
    pub only_links: bool,
}

#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub url: String,
    pub markdown: String,
    pub cleaned_html: String,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub internal_links: Vec<String>,
}

/// POST /extract
///
/// Crawl only: markdown plus the cleaned HTML the markdown was rendered from.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlResponse>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let crawl = state
        .crawler
        .crawl_page(&request.url, request.bypass_cache)
        .await;

    if !crawl.success {
        let mut metadata = Map::new();
        metadata.insert("status_code".into(), json!(crawl.status_code));
        return Ok(Json(CrawlResponse {
            success: false,
            url: request.url,
            markdown: String::new(),
            cleaned_html: String::new(),
            metadata,
            error: crawl.error,
            internal_links: Vec::new(),
        }));
    }

    let mut metadata = Map::new();
    metadata.insert("title".into(), json!(crawl.title));
    metadata.insert("status_code".into(), json!(crawl.status_code));
    metadata.insert("markdown_length".into(), json!(crawl.text.chars().count()));
    metadata.insert(
        "fit_markdown_length".into(),
        json!(crawl.fit_text.as_ref().map_or(0, |t| t.chars().count())),
    );
    metadata.insert("links_count".into(), json!(crawl.internal_links.len()));
    metadata.insert("only_links".into(), json!(request.only_links));

    let (markdown, cleaned_html) = if request.only_links {
        (String::new(), String::new())
    } else {
        (crawl.text, crawl.cleaned_html)
    };

    Ok(Json(CrawlResponse {
        success: true,
        url: request.url,
        markdown,
        cleaned_html,
        metadata,
        error: None,
        internal_links: crawl.internal_links,
    }))
}
