//! Resume parsing handler
//!
//! Asks the model for structured resume JSON and extracts the object from its reply

use crate::handlers::extract::JsonBody;
use crate::handlers::{require_api_key, AppState};
use crate::models::api::ParseResumeResponse;
use crate::models::openrouter::CompletionRequest;
use crate::services::prompts::{resume_parse_messages, RESUME_PARSE_MAX_TOKENS, RESUME_PARSE_TEMPERATURE};
use crate::services::{reshaper, validator};
use crate::utils::error::AppResult;
use crate::utils::logging::truncate_content;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle resume parse requests
///
/// POST /api/parse-resume
pub async fn handle_parse_resume(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ParseResumeResponse>> {
    require_api_key(&state.settings)?;

    let request = validator::parse_resume_request(&body).inspect_err(|e| {
        warn!("Resume parse validation failed: {:?}", e);
    })?;

    let model = request
        .model
        .unwrap_or_else(|| state.settings.upstream.default_model.clone());

    info!(
        "Parsing resume of {} characters with model {}",
        request.text.chars().count(),
        model
    );

    let upstream_request = CompletionRequest {
        model,
        messages: resume_parse_messages(&request.text),
        temperature: RESUME_PARSE_TEMPERATURE,
        max_tokens: RESUME_PARSE_MAX_TOKENS,
    };

    let response = state.upstream.complete(upstream_request).await?;
    let raw = reshaper::chat_response(response, String::new()).content;

    debug!("Model output: {}", truncate_content(&raw, 300));

    Ok(Json(reshaper::resume_response(&raw)?))
}
