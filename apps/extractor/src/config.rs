use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::crawl::pruning::ThresholdType;
use crate::extraction::ExtractionStrategy;

pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-2.5-flash";

/// Application configuration loaded from environment variables.
/// Read once at startup; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
    pub crawl: CrawlPolicy,
    pub browserless: Option<BrowserlessConfig>,
}

/// Remote chat-completion endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` disables phase 2.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.1,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Input text is truncated to this many characters before prompting.
    pub max_input_chars: usize,
    pub cv_strategy: ExtractionStrategy,
    pub job_strategy: ExtractionStrategy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 8000,
            cv_strategy: ExtractionStrategy::Direct,
            job_strategy: ExtractionStrategy::Schema,
        }
    }
}

/// Fixed crawl policy applied to every page fetch.
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    pub page_timeout: Duration,
    pub excluded_tags: Vec<String>,
    pub exclude_external_links: bool,
    pub exclude_social_media_links: bool,
    pub social_media_domains: Vec<String>,
    pub process_iframes: bool,
    pub remove_overlay_elements: bool,
    pub pruning_threshold: f64,
    pub threshold_type: ThresholdType,
    pub min_word_threshold: usize,
    /// Paragraphs with fewer words are dropped from the cleaned page.
    pub word_count_threshold: usize,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(30),
            excluded_tags: ["nav", "footer", "header", "aside"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            exclude_external_links: true,
            exclude_social_media_links: true,
            social_media_domains: [
                "facebook.com",
                "twitter.com",
                "x.com",
                "linkedin.com",
                "instagram.com",
                "pinterest.com",
                "tiktok.com",
                "snapchat.com",
                "reddit.com",
                "youtube.com",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            process_iframes: false,
            remove_overlay_elements: true,
            pruning_threshold: 0.48,
            threshold_type: ThresholdType::Dynamic,
            min_word_threshold: 5,
            word_count_threshold: 10,
        }
    }
}

/// Headless rendering service reached over HTTP (Browserless `/content` API).
#[derive(Debug, Clone)]
pub struct BrowserlessConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_defaults = LlmConfig::default();
        let extraction_defaults = ExtractionConfig::default();
        let crawl_defaults = CrawlPolicy::default();

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8000u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm: LlmConfig {
                api_key: optional_env("OPENROUTER_API_KEY"),
                base_url: optional_env("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
                model: optional_env("LLM_MODEL").unwrap_or(llm_defaults.model),
                timeout: Duration::from_secs(parse_env(
                    "LLM_TIMEOUT_SECS",
                    llm_defaults.timeout.as_secs(),
                )?),
                temperature: parse_env("LLM_TEMPERATURE", llm_defaults.temperature)?,
                max_tokens: parse_env("LLM_MAX_TOKENS", llm_defaults.max_tokens)?,
            },
            extraction: ExtractionConfig {
                max_input_chars: parse_env(
                    "LLM_MAX_INPUT_CHARS",
                    extraction_defaults.max_input_chars,
                )?,
                cv_strategy: parse_env("CV_EXTRACTION_STRATEGY", extraction_defaults.cv_strategy)?,
                job_strategy: parse_env(
                    "JOB_EXTRACTION_STRATEGY",
                    extraction_defaults.job_strategy,
                )?,
            },
            crawl: CrawlPolicy {
                page_timeout: Duration::from_secs(parse_env(
                    "CRAWL_PAGE_TIMEOUT_SECS",
                    crawl_defaults.page_timeout.as_secs(),
                )?),
                pruning_threshold: parse_env(
                    "CRAWL_PRUNING_THRESHOLD",
                    crawl_defaults.pruning_threshold,
                )?,
                threshold_type: parse_env(
                    "CRAWL_PRUNING_THRESHOLD_TYPE",
                    crawl_defaults.threshold_type,
                )?,
                min_word_threshold: parse_env(
                    "CRAWL_MIN_WORD_THRESHOLD",
                    crawl_defaults.min_word_threshold,
                )?,
                word_count_threshold: parse_env(
                    "CRAWL_WORD_COUNT_THRESHOLD",
                    crawl_defaults.word_count_threshold,
                )?,
                ..crawl_defaults
            },
            browserless: optional_env("BROWSERLESS_URL").map(|base_url| BrowserlessConfig {
                base_url,
                token: optional_env("BROWSERLESS_TOKEN"),
            }),
        })
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            rust_log: "info".to_string(),
            llm: LlmConfig::default(),
            extraction: ExtractionConfig::default(),
            crawl: CrawlPolicy::default(),
            browserless: None,
        }
    }
}

/// Returns the variable's value, treating empty strings as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_value(key, &raw),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("Environment variable '{key}' has invalid value '{raw}': {e}"))
}
