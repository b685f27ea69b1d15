// Phase 1: turn a URL into clean markdown.
// The adapter owns the crawl policy and the timeout; the engine does the work.
// Nothing here ever returns an error to the caller: failures are CrawlResult data.

pub mod content;
pub mod engine;
pub mod handlers;
pub mod http_engine;
pub mod pruning;

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::CrawlPolicy;
use crate::crawl::engine::{CacheMode, CrawlEngine, EngineOutput, MarkdownRendering};

/// Normalized outcome of one crawl.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlResult {
    pub success: bool,
    /// Upstream HTTP status, when the engine reached the page.
    pub status_code: Option<u16>,
    pub text: String,
    pub error: Option<String>,
    pub title: Option<String>,
    pub cleaned_html: String,
    pub fit_text: Option<String>,
    pub internal_links: Vec<String>,
}

impl CrawlResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

type TextStrategy = fn(&MarkdownRendering) -> Option<String>;

/// Tried in order; the first strategy that yields text wins.
const TEXT_STRATEGIES: &[(&str, TextStrategy)] = &[
    ("raw_markdown", raw_markdown),
    ("fit_markdown", fit_markdown),
    ("stringified", stringified),
];

fn raw_markdown(m: &MarkdownRendering) -> Option<String> {
    m.raw_markdown.clone()
}

fn fit_markdown(m: &MarkdownRendering) -> Option<String> {
    m.fit_markdown.clone()
}

fn stringified(m: &MarkdownRendering) -> Option<String> {
    Some(m.to_string())
}

/// Picks the page text from whatever renderings the engine produced.
pub fn select_text(rendering: Option<&MarkdownRendering>) -> String {
    let Some(rendering) = rendering else {
        return String::new();
    };
    TEXT_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            strategy(rendering).map(|text| {
                tracing::debug!(strategy = *name, "Selected page text");
                text
            })
        })
        .unwrap_or_default()
}

/// Wraps a [`CrawlEngine`] with the fixed crawl policy.
#[derive(Clone)]
pub struct CrawlAdapter {
    engine: Arc<dyn CrawlEngine>,
    policy: CrawlPolicy,
}

impl CrawlAdapter {
    pub fn new(engine: Arc<dyn CrawlEngine>, policy: CrawlPolicy) -> Self {
        Self { engine, policy }
    }

    /// Crawls `url` once. Timeouts, engine-reported failures and engine
    /// errors all come back as `success = false`.
    pub async fn crawl_page(&self, url: &str, bypass_cache: bool) -> CrawlResult {
        info!(url, bypass_cache, "Phase 1: crawling");
        let cache_mode = CacheMode::from_bypass(bypass_cache);
        let timeout = self.policy.page_timeout;

        let outcome =
            tokio::time::timeout(timeout, self.engine.crawl(url, &self.policy, cache_mode)).await;

        let result = match outcome {
            Err(_) => CrawlResult::failed(format!(
                "Page timeout ({}s exceeded)",
                timeout.as_secs()
            )),
            Ok(Err(e)) => {
                error!(url, error = ?e, "Crawl engine error");
                CrawlResult::failed(format!("Crawl error: {e}"))
            }
            Ok(Ok(output)) if !output.success => {
                warn!(url, status_code = ?output.status_code, "Engine reported a failed crawl");
                CrawlResult {
                    status_code: output.status_code,
                    ..CrawlResult::failed(format!(
                        "Crawl failed: {}",
                        output
                            .error_message
                            .as_deref()
                            .unwrap_or("unknown error")
                    ))
                }
            }
            Ok(Ok(output)) => Self::normalize(output),
        };

        if result.success {
            info!(url, chars = result.text.chars().count(), "Crawl successful");
        }
        result
    }

    fn normalize(output: EngineOutput) -> CrawlResult {
        let text = select_text(output.markdown.as_ref());
        CrawlResult {
            success: true,
            status_code: output.status_code,
            text,
            error: None,
            title: output.title,
            cleaned_html: output.cleaned_html,
            fit_text: output.markdown.and_then(|m| m.fit_markdown),
            internal_links: output.internal_links,
        }
    }
}
