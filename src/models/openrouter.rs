//! OpenRouter API data models
//!
//! Defines the upstream request and response structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat completion request sent upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Resolved model identifier
    pub model: String,
    /// Message list
    pub messages: Vec<UpstreamMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Upstream message structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    /// Role (system/user/assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

impl UpstreamMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Chat completion response
///
/// Only the fields the proxy reads are typed; `usage` is kept verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamChatResponse {
    /// Response ID (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Choices
    #[serde(default)]
    pub choices: Vec<UpstreamChoice>,
    /// Usage statistics, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

/// Completion choice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamChoice {
    #[serde(default)]
    pub message: Option<UpstreamChoiceMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Message inside a completion choice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// `GET /models` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub data: Vec<UpstreamModel>,
}

/// Model entry as listed upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamModel {
    /// Upstream identifier, e.g. `meta-llama/llama-3.1-8b-instruct:free`
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Per-token pricing
    #[serde(default)]
    pub pricing: Option<ModelPricing>,
    /// Context window (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

/// Pricing block
///
/// Upstream sends prices as decimal strings; values are kept raw so that only
/// the literal string `"0"` counts as free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: Option<Value>,
    #[serde(default)]
    pub completion: Option<Value>,
}

/// Upstream error body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub error: Option<UpstreamErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Upstream error detail
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

impl UpstreamErrorBody {
    /// Best message available in the body
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}
