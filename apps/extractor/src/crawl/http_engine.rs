//! HTTP crawl engine: fetches a page directly with reqwest, or fully
//! rendered through a Browserless-compatible `/content` endpoint, then reduces
//! it with [`process_html`].

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::config::{BrowserlessConfig, CrawlPolicy};
use crate::crawl::content::process_html;
use crate::crawl::engine::{CacheMode, CrawlEngine, EngineOutput};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where page HTML comes from.
#[derive(Debug, Clone)]
enum PageSource {
    Direct,
    Browserless(BrowserlessConfig),
}

pub struct HttpCrawlEngine {
    client: reqwest::Client,
    source: PageSource,
}

/// Why a fetch produced no HTML. Rendered into `EngineOutput::error_message`.
#[derive(Debug)]
struct FetchFailure {
    status_code: Option<u16>,
    message: String,
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self {
            status_code: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl HttpCrawlEngine {
    pub fn new(policy: &CrawlPolicy, browserless: Option<BrowserlessConfig>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(policy.page_timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create crawl HTTP client")?;

        let source = match browserless {
            Some(config) => {
                info!(base_url = %config.base_url, "Crawl engine renders pages through Browserless");
                PageSource::Browserless(config)
            }
            None => PageSource::Direct,
        };

        Ok(Self { client, source })
    }

    /// Adds `https://` when the scheme is missing.
    fn normalize_url(url: &str) -> String {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        }
    }

    async fn fetch_html(&self, url: &Url, cache_mode: CacheMode) -> Result<String, FetchFailure> {
        let request = match &self.source {
            PageSource::Direct => self.client.get(url.as_str()),
            PageSource::Browserless(config) => {
                let mut endpoint = format!("{}/content", config.base_url.trim_end_matches('/'));
                if let Some(token) = &config.token {
                    endpoint.push_str(&format!("?token={token}"));
                }
                self.client
                    .post(endpoint)
                    .json(&json!({ "url": url.as_str() }))
            }
        };

        let request = match cache_mode {
            CacheMode::Bypass => request
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache"),
            CacheMode::Enabled => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure {
                status_code: Some(status.as_u16()),
                message: format!("HTTP {status}"),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CrawlEngine for HttpCrawlEngine {
    async fn crawl(
        &self,
        url: &str,
        policy: &CrawlPolicy,
        cache_mode: CacheMode,
    ) -> Result<EngineOutput> {
        let normalized = Self::normalize_url(url);
        let page_url = match Url::parse(&normalized) {
            Ok(u) => u,
            Err(e) => return Ok(EngineOutput::failed(format!("invalid URL '{url}': {e}"))),
        };

        debug!(url = %page_url, ?cache_mode, "Fetching page");
        let html = match self.fetch_html(&page_url, cache_mode).await {
            Ok(html) => html,
            Err(failure) => {
                return Ok(EngineOutput {
                    status_code: failure.status_code,
                    ..EngineOutput::failed(failure.message)
                })
            }
        };

        // DOM work is CPU-bound: keep it off the async workers.
        let html_len = html.len();
        let log_url = page_url.to_string();
        let page_policy = policy.clone();
        let page = tokio::task::spawn_blocking(move || process_html(&html, &page_url, &page_policy))
            .await
            .map_err(|e| anyhow!("page processing failed: {e}"))?;
        debug!(
            url = %log_url,
            html_len,
            cleaned_len = page.cleaned_html.len(),
            "Page reduced"
        );

        Ok(EngineOutput {
            success: true,
            status_code: Some(200),
            error_message: None,
            markdown: Some(page.markdown),
            cleaned_html: page.cleaned_html,
            title: page.title,
            internal_links: page.internal_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_server, static_pages};
    use axum::http::StatusCode;

    fn engine() -> HttpCrawlEngine {
        HttpCrawlEngine::new(&CrawlPolicy::default(), None).unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            HttpCrawlEngine::normalize_url("example.com"),
            "https://example.com"
        );
        assert_eq!(
            HttpCrawlEngine::normalize_url(" http://example.com "),
            "http://example.com"
        );
    }

    #[tokio::test]
    async fn test_crawl_renders_markdown() {
        let base = spawn_server(static_pages()).await;
        let output = engine()
            .crawl(&format!("{base}/cv"), &CrawlPolicy::default(), CacheMode::Enabled)
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.title.as_deref(), Some("Ada Lovelace"));
        let raw = output.markdown.unwrap().raw_markdown.unwrap();
        assert!(raw.contains("Analytical Engine"));
        assert!(!raw.contains("Site navigation"));
    }

    #[tokio::test]
    async fn test_consent_dialog_page_keeps_main_content() {
        let base = spawn_server(static_pages()).await;
        let output = engine()
            .crawl(&format!("{base}/consent"), &CrawlPolicy::default(), CacheMode::Enabled)
            .await
            .unwrap();

        assert!(output.success);
        let raw = output.markdown.unwrap().raw_markdown.unwrap();
        assert!(raw.contains("replicated log in Rust"));
        assert!(!raw.contains("value your privacy"));
    }

    #[tokio::test]
    async fn test_http_error_is_engine_failure() {
        let base = spawn_server(static_pages()).await;
        let output = engine()
            .crawl(&format!("{base}/missing"), &CrawlPolicy::default(), CacheMode::Bypass)
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.status_code, Some(StatusCode::NOT_FOUND.as_u16()));
        assert_eq!(output.error_message.as_deref(), Some("HTTP 404 Not Found"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_engine_failure() {
        // Port 9 (discard) is closed on loopback in test environments.
        let output = engine()
            .crawl("http://127.0.0.1:9/cv", &CrawlPolicy::default(), CacheMode::Enabled)
            .await
            .unwrap();

        assert!(!output.success);
        assert!(output.error_message.is_some());
    }

    #[tokio::test]
    async fn test_browserless_source_posts_url() {
        let base = spawn_server(static_pages()).await;
        let engine = HttpCrawlEngine::new(
            &CrawlPolicy::default(),
            Some(BrowserlessConfig {
                base_url: base.clone(),
                token: Some("secret".into()),
            }),
        )
        .unwrap();

        let output = engine
            .crawl("https://somewhere.example/profile", &CrawlPolicy::default(), CacheMode::Enabled)
            .await
            .unwrap();

        assert!(output.success);
        let raw = output.markdown.unwrap().raw_markdown.unwrap();
        assert!(raw.contains("rendered https://somewhere.example/profile"));
    }
}
