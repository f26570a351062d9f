//! Response reshaping
//!
//! Turns upstream payloads into the proxy's simplified envelopes

use crate::models::api::{ChatResponse, ModelSummary, ModelsResponse, ParseResumeResponse};
use crate::models::openrouter::{UpstreamChatResponse, UpstreamModel};
use crate::utils::error::{AppError, AppResult};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Models returned per listing
pub const MAX_LISTED_MODELS: usize = 50;

/// Marker upstream appends to free-tier model ids
pub const FREE_MODEL_MARKER: &str = ":free";

/// Whether a model costs nothing to call
///
/// Either the id carries the free marker, or both prices are the literal string `"0"`.
pub fn is_free_model(model: &UpstreamModel) -> bool {
    if model.id.contains(FREE_MODEL_MARKER) {
        return true;
    }

    let is_zero = |price: &Option<Value>| price.as_ref().and_then(Value::as_str) == Some("0");

    model
        .pricing
        .as_ref()
        .map(|p| is_zero(&p.prompt) && is_zero(&p.completion))
        .unwrap_or(false)
}

/// Display name, falling back to the id
pub fn display_name(model: &UpstreamModel) -> &str {
    model
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(model.id.as_str())
}

/// Case-insensitive ordering with an exact comparison as tie-break
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| a.cmp(b))
}

/// Build the model listing: free first, then by name, capped at [`MAX_LISTED_MODELS`]
pub fn summarize_models(models: Vec<UpstreamModel>) -> ModelsResponse {
    let total_count = models.len();

    let mut summaries: Vec<ModelSummary> = models
        .iter()
        .map(|m| ModelSummary {
            id: m.id.clone(),
            name: display_name(m).to_string(),
            is_free: is_free_model(m),
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.is_free
            .cmp(&a.is_free)
            .then_with(|| locale_compare(&a.name, &b.name))
    });
    summaries.truncate(MAX_LISTED_MODELS);

    debug!("Listing {} of {} upstream models", summaries.len(), total_count);

    ModelsResponse {
        success: true,
        models: summaries,
        total_count,
    }
}

/// Build the chat envelope from the first choice
pub fn chat_response(response: UpstreamChatResponse, model: String) -> ChatResponse {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default();

    ChatResponse {
        success: true,
        content,
        model,
        usage: response.usage,
    }
}

/// Widest brace-delimited span: first `{` through last `}`
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Decode the JSON object embedded in free-form model output
///
/// Both a missing span and an undecodable span yield [`AppError::Parse`]
/// carrying the untouched model output.
pub fn extract_json_object(raw: &str) -> AppResult<Value> {
    let span = extract_json_span(raw).ok_or_else(|| {
        warn!("Model output contained no JSON object");
        AppError::Parse { raw_content: raw.to_string() }
    })?;

    serde_json::from_str::<Value>(span).map_err(|e| {
        warn!("Model output JSON span failed to decode: {}", e);
        AppError::Parse { raw_content: raw.to_string() }
    })
}

/// Build the parse-resume envelope from raw model output
pub fn resume_response(raw: &str) -> AppResult<ParseResumeResponse> {
    let data = extract_json_object(raw)?;

    Ok(ParseResumeResponse {
        success: true,
        data,
        method: "ai".to_string(),
    })
}
