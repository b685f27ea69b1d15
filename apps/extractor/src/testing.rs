//! Shared test fixtures: a scripted crawl engine, in-process HTTP servers
//! standing in for the LLM endpoint and target pages, and router drivers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Query,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::{Config, CrawlPolicy, LlmConfig};
use crate::crawl::engine::{CacheMode, CrawlEngine, EngineOutput, MarkdownRendering};
use crate::crawl::CrawlAdapter;
use crate::extraction::Extractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

enum Script {
    Page(EngineOutput),
    Failed(EngineOutput),
    Broken(String),
}

/// A crawl engine that replays one scripted outcome for every URL.
pub struct StaticEngine {
    script: Script,
    delay: Option<Duration>,
}

impl StaticEngine {
    pub fn page(markdown: &str) -> Self {
        Self {
            script: Script::Page(EngineOutput {
                success: true,
                status_code: Some(200),
                markdown: Some(MarkdownRendering {
                    raw_markdown: Some(markdown.to_string()),
                    fit_markdown: None,
                }),
                ..EngineOutput::default()
            }),
            delay: None,
        }
    }

    /// Engine-reported failure, as for a host that cannot be resolved.
    pub fn unreachable(message: &str) -> Self {
        Self {
            script: Script::Failed(EngineOutput::failed(message)),
            delay: None,
        }
    }

    /// Engine-reported failure after the target answered with `status`.
    pub fn http_error(status: u16, message: &str) -> Self {
        Self {
            script: Script::Failed(EngineOutput {
                status_code: Some(status),
                ..EngineOutput::failed(message)
            }),
            delay: None,
        }
    }

    /// Engine error, as for a crashed browser.
    pub fn broken(message: &str) -> Self {
        Self {
            script: Script::Broken(message.to_string()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_html(mut self, html: &str) -> Self {
        if let Script::Page(output) = &mut self.script {
            output.cleaned_html = html.to_string();
        }
        self
    }

    pub fn with_links(mut self, links: &[&str]) -> Self {
        if let Script::Page(output) = &mut self.script {
            output.internal_links = links.iter().map(|l| l.to_string()).collect();
        }
        self
    }
}

#[async_trait]
impl CrawlEngine for StaticEngine {
    async fn crawl(
        &self,
        _url: &str,
        _policy: &CrawlPolicy,
        _cache_mode: CacheMode,
    ) -> anyhow::Result<EngineOutput> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Page(output) | Script::Failed(output) => Ok(output.clone()),
            Script::Broken(message) => Err(anyhow!("{message}")),
        }
    }
}

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn chat_envelope(content: &str) -> Value {
    json!({
        "id": "gen-test",
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 40 }
    })
}

/// Chat-completion endpoint that answers every request with `content`.
/// Non-200 statuses return `content` as the raw error body.
pub fn fake_llm(status: StatusCode, content: &str) -> Router {
    let content = content.to_string();
    Router::new().route(
        "/chat/completions",
        post(move || {
            let content = content.clone();
            async move {
                if status == StatusCode::OK {
                    Json(chat_envelope(&content)).into_response()
                } else {
                    (status, content).into_response()
                }
            }
        }),
    )
}

/// Like [`fake_llm`] with a 200 status, also keeping every request body.
pub fn recording_llm(content: &str) -> (Router, Arc<Mutex<Vec<Value>>>) {
    let content = content.to_string();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let router = Router::new().route(
        "/chat/completions",
        post(move |Json(body): Json<Value>| {
            let content = content.clone();
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(body);
                Json(chat_envelope(&content))
            }
        }),
    );
    (router, requests)
}

const CV_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Ada Lovelace</title></head>
<body>
  <nav><a href="/">Home</a> Site navigation</nav>
  <main>
    <h1>Ada Lovelace</h1>
    <p>Mathematician and writer, chiefly known for her work on the Analytical Engine,
    the proposed mechanical general-purpose computer designed by Charles Babbage.
    She published the first algorithm intended to be carried out by such a machine.</p>
  </main>
  <footer>Copyright notice</footer>
</body>
</html>"#;

const CONSENT_PAGE: &str = r#"<!DOCTYPE html>
<html class="cookie-consent-pending">
<head><title>Careers</title></head>
<body class="modal-open">
  <div class="cookie-modal"><p>We value your privacy and use cookies to personalise content and ads.</p></div>
  <main>
    <h1>Backend Engineer</h1>
    <p>Join the storage team to build a replicated log in Rust, working closely with the query engine group.</p>
  </main>
</body>
</html>"#;

async fn browserless_content(
    Query(_params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Html<String> {
    let url = body["url"].as_str().unwrap_or_default();
    Html(format!(
        "<html><body><p>rendered {url} by the headless browser for the crawl engine tests</p></body></html>"
    ))
}

/// Target site: `/cv` is a profile page, `/consent` a job page behind a
/// cookie dialog, `/content` mimics Browserless,
/// everything else is a 404.
pub fn static_pages() -> Router {
    Router::new()
        .route("/cv", get(|| async { Html(CV_PAGE) }))
        .route("/consent", get(|| async { Html(CONSENT_PAGE) }))
        .route("/content", post(browserless_content))
}

/// App state around `engine`. `llm_base_url` enables phase 2 against that
/// endpoint with a test key; `None` leaves the API key unset.
pub fn test_state(engine: StaticEngine, llm_base_url: Option<&str>) -> AppState {
    let mut config = Config::default();
    if let Some(base_url) = llm_base_url {
        config.llm = LlmConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            ..LlmConfig::default()
        };
    }

    let llm = LlmClient::new(&config.llm).unwrap();
    AppState {
        crawler: CrawlAdapter::new(Arc::new(engine), config.crawl.clone()),
        extractor: Extractor::new(llm, config.extraction.max_input_chars),
        config: Arc::new(config),
    }
}

async fn send(state: AppState, request: Request<Body>) -> (u16, Value) {
    let response: Response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_json(state: AppState, path: &str, body: &str) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

pub async fn get_json(state: AppState, path: &str) -> (u16, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(state, request).await
}
