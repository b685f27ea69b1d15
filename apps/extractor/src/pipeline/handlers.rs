//! Axum handlers for the two-phase extraction endpoints.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::llm_client::API_KEY_VAR;
use crate::models::cv::CvData;
use crate::models::job::JobData;
use crate::pipeline::{run_two_phase, ExtractionRequest, ExtractionResponse, RunOptions};
use crate::state::AppState;

fn require_url(request: &ExtractionRequest) -> Result<(), AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }
    Ok(())
}

/// POST /extract-cv
///
/// LLM extraction is on by default. A missing API key only costs the
/// structured data: the markdown still comes back, with a warning.
pub async fn handle_extract_cv(
    State(state): State<AppState>,
    Json(request): Json<ExtractionRequest>,
) -> Result<Json<ExtractionResponse<CvData>>, AppError> {
    require_url(&request)?;

    let options = RunOptions {
        use_llm: request.use_llm.unwrap_or(true),
        bypass_cache: request.bypass_cache,
        strategy: state.config.extraction.cv_strategy,
    };
    Ok(Json(run_two_phase(&state, request.url, options).await))
}

/// POST /extract-job
///
/// LLM extraction is off by default. Asking for it without an API key is a
/// server misconfiguration and fails the request before anything is crawled.
pub async fn handle_extract_job(
    State(state): State<AppState>,
    Json(request): Json<ExtractionRequest>,
) -> Result<Json<ExtractionResponse<JobData>>, AppError> {
    require_url(&request)?;

    let use_llm = request.use_llm.unwrap_or(false);
    if use_llm && !state.extractor.is_configured() {
        return Err(AppError::LlmNotConfigured(API_KEY_VAR));
    }

    let options = RunOptions {
        use_llm,
        bypass_cache: request.bypass_cache,
        strategy: state.config.extraction.job_strategy,
    };
    Ok(Json(run_two_phase(&state, request.url, options).await))
}
