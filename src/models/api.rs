//! Proxy API data models
//!
//! Request and response structures exposed to proxy clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Temperature applied when a chat request omits it
pub const DEFAULT_TEMPERATURE: f64 = 0.6;

/// Token budget applied when a chat request omits it
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Validated chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Validated `POST /api/chat` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation, never empty
    pub messages: Vec<ChatMessage>,
    /// Requested model (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature in [0, 2] (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Token budget in [1, 4000] (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Validated `POST /api/parse-resume` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResumeRequest {
    /// Raw resume text
    pub text: String,
    /// Requested model (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// `POST /api/chat` success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    /// Assistant message text, empty when upstream sent none
    pub content: String,
    /// Model actually sent upstream
    pub model: String,
    /// Upstream usage block, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

/// Model entry returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "isFree")]
    pub is_free: bool,
}

/// `GET /api/models` success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Vec<ModelSummary>,
    /// Size of the full upstream list, before truncation
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

/// `POST /api/parse-resume` success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResumeResponse {
    pub success: bool,
    /// Decoded object as produced by the model, not re-validated
    pub data: Value,
    /// Extraction method, always `"ai"`
    pub method: String,
}
