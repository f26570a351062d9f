//! Logging utilities
//!
//! Subscriber setup and helpers that keep large payloads out of the logs

use crate::config::settings::LoggingConfig;
use crate::models::openrouter::CompletionRequest;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Set to true to include full prompts in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Install the global tracing subscriber
///
/// Human-readable output by default, JSON when `format` is `json`.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!("Logging system initialized");
    Ok(())
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!(
            "{}... ({} chars truncated)",
            &s[..byte_index],
            s.chars().count() - max_chars
        ),
        None => s.to_string(),
    }
}

/// Create a filtered summary of an upstream request for logging
/// Keeps original structure but truncates message content
pub fn create_request_log_summary(request: &CompletionRequest) -> serde_json::Value {
    if VERBOSE_REQUEST_LOGGING {
        return serde_json::to_value(request)
            .unwrap_or_else(|_| serde_json::json!({"error": "serialize failed"}));
    }

    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|m| {
            // For system messages, truncate more aggressively
            let max_len = if m.role == "system" { 100 } else { 200 };
            serde_json::json!({
                "role": m.role,
                "content": truncate_content(&m.content, max_len),
            })
        })
        .collect();

    serde_json::json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": messages,
    })
}
