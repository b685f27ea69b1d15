mod config;
mod crawl;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::crawl::http_engine::HttpCrawlEngine;
use crate::crawl::CrawlAdapter;
use crate::extraction::Extractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting page extractor v{}", env!("CARGO_PKG_VERSION"));

    // Phase 1: crawl engine
    let engine = HttpCrawlEngine::new(&config.crawl, config.browserless.clone())?;
    match &config.browserless {
        Some(b) => info!("Crawl engine: Browserless at {}", b.base_url),
        None => info!("Crawl engine: direct HTTP fetch"),
    }
    let crawler = CrawlAdapter::new(Arc::new(engine), config.crawl.clone());

    // Phase 2: LLM extraction
    let llm = LlmClient::new(&config.llm)?;
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENROUTER_API_KEY not set; LLM extraction disabled");
    }
    let extractor = Extractor::new(llm, config.extraction.max_input_chars);

    let state = AppState {
        config: Arc::new(config.clone()),
        crawler,
        extractor,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
