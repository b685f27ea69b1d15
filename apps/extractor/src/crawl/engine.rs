//! The crawling engine seam.
//!
//! The adapter only sees [`EngineOutput`]; how a page is fetched, rendered and
//! reduced is the engine's business.

use std::fmt;

use async_trait::async_trait;

use crate::config::CrawlPolicy;

/// Whether the engine may serve a cached rendering of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Enabled,
    Bypass,
}

impl CacheMode {
    pub fn from_bypass(bypass_cache: bool) -> Self {
        if bypass_cache {
            CacheMode::Bypass
        } else {
            CacheMode::Enabled
        }
    }
}

/// The markdown renderings an engine may produce for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownRendering {
    /// Full-page markdown after tag exclusion.
    pub raw_markdown: Option<String>,
    /// Markdown of the blocks kept by the content filter.
    pub fit_markdown: Option<String>,
}

impl fmt::Display for MarkdownRendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.raw_markdown.as_deref(), self.fit_markdown.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", parts.join("\n\n"))
    }
}

/// Everything a crawl engine reports about one page.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub success: bool,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub markdown: Option<MarkdownRendering>,
    pub cleaned_html: String,
    pub title: Option<String>,
    pub internal_links: Vec<String>,
}

impl EngineOutput {
    /// An engine-reported failure (unreachable host, HTTP error status, ...).
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// A headless-browser or HTTP crawling engine.
///
/// Engines report expected failures through `EngineOutput::success`; an `Err`
/// means something unexpected broke inside the engine.
#[async_trait]
pub trait CrawlEngine: Send + Sync {
    async fn crawl(
        &self,
        url: &str,
        policy: &CrawlPolicy,
        cache_mode: CacheMode,
    ) -> anyhow::Result<EngineOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_display_joins_available_parts() {
        let rendering = MarkdownRendering {
            raw_markdown: Some("# Raw".into()),
            fit_markdown: Some("Fit".into()),
        };
        assert_eq!(rendering.to_string(), "# Raw\n\nFit");
        assert_eq!(MarkdownRendering::default().to_string(), "");
    }

    #[test]
    fn test_cache_mode_from_flag() {
        assert_eq!(CacheMode::from_bypass(true), CacheMode::Bypass);
        assert_eq!(CacheMode::from_bypass(false), CacheMode::Enabled);
    }
}
