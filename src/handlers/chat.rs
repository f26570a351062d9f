//! Chat completion handler
//!
//! Validates the conversation, forwards it upstream and returns the first choice

use crate::handlers::extract::JsonBody;
use crate::handlers::{require_api_key, AppState};
use crate::models::api::{ChatRequest, ChatResponse};
use crate::models::openrouter::{CompletionRequest, UpstreamMessage};
use crate::services::{reshaper, validator};
use crate::utils::error::AppResult;
use crate::utils::logging::create_request_log_summary;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle chat requests
///
/// POST /api/chat
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ChatResponse>> {
    require_api_key(&state.settings)?;

    let chat_request = validator::parse_chat_request(&body).inspect_err(|e| {
        warn!("Chat request validation failed: {:?}", e);
    })?;

    let upstream_request = build_completion_request(&chat_request, &state.settings.upstream.default_model);
    let model = upstream_request.model.clone();

    if let Ok(summary_json) = serde_json::to_string_pretty(&create_request_log_summary(&upstream_request)) {
        debug!("Upstream chat request:\n{}", summary_json);
    }

    let response = state.upstream.complete(upstream_request).await?;

    Ok(Json(reshaper::chat_response(response, model)))
}

/// Resolve defaults and map the validated request onto the upstream shape
pub fn build_completion_request(request: &ChatRequest, default_model: &str) -> CompletionRequest {
    CompletionRequest {
        model: request
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string()),
        messages: request
            .messages
            .iter()
            .map(|m| UpstreamMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect(),
        temperature: request.temperature_or_default(),
        max_tokens: request.max_tokens_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::{ChatMessage, Role};

    #[test]
    fn test_defaults_are_applied() {
        let request = ChatRequest {
            messages: vec![ChatMessage { role: Role::User, content: "hi".to_string() }],
            model: None,
            temperature: None,
            max_tokens: None,
        };

        let upstream = build_completion_request(&request, "fallback/model:free");
        assert_eq!(upstream.model, "fallback/model:free");
        assert_eq!(upstream.temperature, 0.6);
        assert_eq!(upstream.max_tokens, 1000);
        assert_eq!(upstream.messages, vec![UpstreamMessage::user("hi")]);
    }

    #[test]
    fn test_explicit_values_win() {
        let request = ChatRequest {
            messages: vec![ChatMessage { role: Role::System, content: "be brief".to_string() }],
            model: Some("openai/gpt-4o".to_string()),
            temperature: Some(0.0),
            max_tokens: Some(42),
        };

        let upstream = build_completion_request(&request, "fallback/model:free");
        assert_eq!(upstream.model, "openai/gpt-4o");
        assert_eq!(upstream.temperature, 0.0);
        assert_eq!(upstream.max_tokens, 42);
        assert_eq!(upstream.messages[0].role, "system");
    }
}
