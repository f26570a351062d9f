//! Request validation
//!
//! Checks raw JSON bodies and collects every violation instead of stopping at
//! the first one. Lengths are counted in characters, not bytes.

use crate::models::api::{ChatMessage, ChatRequest, ParseResumeRequest, Role};
use crate::utils::error::{AppError, AppResult};
use serde_json::Value;

/// Longest accepted chat message content
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 50_000;

/// Longest accepted resume text
pub const MAX_RESUME_TEXT_CHARS: usize = 100_000;

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;
pub const MIN_MAX_TOKENS: u32 = 1;
pub const MAX_MAX_TOKENS: u32 = 4000;

/// Look up an optional field; JSON `null` counts as absent
fn optional<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

fn as_integer(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.fract() == 0.0)
}

/// Validate a chat body, returning all violations in order
pub fn validate_chat_request(body: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    match body.get("messages").and_then(Value::as_array) {
        None => errors.push("messages must be an array".to_string()),
        Some(messages) if messages.is_empty() => {
            errors.push("messages array cannot be empty".to_string())
        }
        Some(messages) => {
            for (i, message) in messages.iter().enumerate() {
                let role_ok = message
                    .get("role")
                    .and_then(Value::as_str)
                    .and_then(Role::parse)
                    .is_some();
                if !role_ok {
                    errors.push(format!(
                        "messages[{}].role must be 'system', 'user', or 'assistant'",
                        i
                    ));
                }

                match message.get("content").and_then(Value::as_str) {
                    Some(content) if !content.is_empty() => {
                        if content.chars().count() > MAX_MESSAGE_CONTENT_CHARS {
                            errors.push(format!(
                                "messages[{}].content exceeds maximum length of {} characters",
                                i, MAX_MESSAGE_CONTENT_CHARS
                            ));
                        }
                    }
                    _ => errors.push(format!("messages[{}].content must be a non-empty string", i)),
                }
            }
        }
    }

    if let Some(model) = optional(body, "model") {
        if !model.is_string() {
            errors.push("model must be a string".to_string());
        }
    }

    if let Some(temperature) = optional(body, "temperature") {
        let in_range = temperature
            .as_f64()
            .map(|t| (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t))
            .unwrap_or(false);
        if !in_range {
            errors.push(format!(
                "temperature must be a number between {} and {}",
                MIN_TEMPERATURE, MAX_TEMPERATURE
            ));
        }
    }

    if let Some(max_tokens) = optional(body, "max_tokens") {
        let in_range = as_integer(max_tokens)
            .map(|n| n >= MIN_MAX_TOKENS as f64 && n <= MAX_MAX_TOKENS as f64)
            .unwrap_or(false);
        if !in_range {
            errors.push(format!(
                "max_tokens must be an integer between {} and {}",
                MIN_MAX_TOKENS, MAX_MAX_TOKENS
            ));
        }
    }

    errors
}

/// Validate a parse-resume body, returning all violations in order
pub fn validate_parse_resume_request(body: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    match body.get("text").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => {
            if text.chars().count() > MAX_RESUME_TEXT_CHARS {
                errors.push(format!(
                    "text exceeds maximum length of {} characters",
                    MAX_RESUME_TEXT_CHARS
                ));
            }
        }
        _ => errors.push("text is required and must be a non-empty string".to_string()),
    }

    if let Some(model) = optional(body, "model") {
        if !model.is_string() {
            errors.push("model must be a string".to_string());
        }
    }

    errors
}

/// Validate and convert a chat body into a typed request
pub fn parse_chat_request(body: &Value) -> AppResult<ChatRequest> {
    let errors = validate_chat_request(body);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|m| {
            let role = m.get("role").and_then(Value::as_str).and_then(Role::parse)?;
            let content = m.get("content").and_then(Value::as_str)?;
            Some(ChatMessage { role, content: content.to_string() })
        })
        .collect();

    Ok(ChatRequest {
        messages,
        model: optional(body, "model").and_then(Value::as_str).map(str::to_string),
        temperature: optional(body, "temperature").and_then(Value::as_f64),
        max_tokens: optional(body, "max_tokens").and_then(as_integer).map(|n| n as u32),
    })
}

/// Validate and convert a parse-resume body into a typed request
pub fn parse_resume_request(body: &Value) -> AppResult<ParseResumeRequest> {
    let errors = validate_parse_resume_request(body);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(ParseResumeRequest {
        text: body
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        model: optional(body, "model").and_then(Value::as_str).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_chat_request() {
        let body = json!({
            "messages": [
                {"role": "system", "content": "You are helpful"},
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi there"}
            ],
            "model": "openai/gpt-4o",
            "temperature": 2,
            "max_tokens": 4000
        });
        assert!(validate_chat_request(&body).is_empty());

        let minimal = json!({"messages": [{"role": "user", "content": "x"}]});
        assert!(validate_chat_request(&minimal).is_empty());
    }

    #[test]
    fn test_bogus_role_and_empty_content_give_two_violations() {
        let body = json!({"messages": [{"role": "bogus", "content": ""}]});
        let errors = validate_chat_request(&body);

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.starts_with("messages[0].")));
        assert_eq!(errors[0], "messages[0].role must be 'system', 'user', or 'assistant'");
        assert_eq!(errors[1], "messages[0].content must be a non-empty string");
    }

    #[test]
    fn test_missing_messages_skips_element_checks() {
        let errors = validate_chat_request(&json!({"messages": "hi"}));
        assert_eq!(errors, vec!["messages must be an array"]);

        let errors = validate_chat_request(&json!({}));
        assert_eq!(errors, vec!["messages must be an array"]);

        let errors = validate_chat_request(&json!({"messages": []}));
        assert_eq!(errors, vec!["messages array cannot be empty"]);
    }

    #[test]
    fn test_violations_accumulate_across_messages_and_fields() {
        let body = json!({
            "messages": [
                {"role": "user", "content": "ok"},
                {"role": "tool", "content": 42},
                "not an object"
            ],
            "model": 7,
            "temperature": 2.5,
            "max_tokens": 0
        });
        let errors = validate_chat_request(&body);

        assert_eq!(
            errors,
            vec![
                "messages[1].role must be 'system', 'user', or 'assistant'",
                "messages[1].content must be a non-empty string",
                "messages[2].role must be 'system', 'user', or 'assistant'",
                "messages[2].content must be a non-empty string",
                "model must be a string",
                "temperature must be a number between 0 and 2",
                "max_tokens must be an integer between 1 and 4000",
            ]
        );
    }

    #[test]
    fn test_content_length_limit() {
        let at_limit = "a".repeat(MAX_MESSAGE_CONTENT_CHARS);
        let body = json!({"messages": [{"role": "user", "content": at_limit}]});
        assert!(validate_chat_request(&body).is_empty());

        let over = "a".repeat(MAX_MESSAGE_CONTENT_CHARS + 1);
        let body = json!({"messages": [{"role": "user", "content": over}]});
        assert_eq!(
            validate_chat_request(&body),
            vec!["messages[0].content exceeds maximum length of 50000 characters"]
        );
    }

    #[test]
    fn test_max_tokens_must_be_integer() {
        let base = |v: Value| json!({"messages": [{"role": "user", "content": "x"}], "max_tokens": v});

        assert!(validate_chat_request(&base(json!(1))).is_empty());
        assert!(validate_chat_request(&base(json!(500.0))).is_empty());
        assert_eq!(validate_chat_request(&base(json!(10.5))).len(), 1);
        assert_eq!(validate_chat_request(&base(json!(4001))).len(), 1);
        assert_eq!(validate_chat_request(&base(json!("100"))).len(), 1);
    }

    #[test]
    fn test_null_optionals_are_absent() {
        let body = json!({
            "messages": [{"role": "user", "content": "x"}],
            "model": null,
            "temperature": null,
            "max_tokens": null
        });
        assert!(validate_chat_request(&body).is_empty());

        let request = parse_chat_request(&body).unwrap();
        assert_eq!(request.model, None);
        assert_eq!(request.temperature_or_default(), 0.6);
        assert_eq!(request.max_tokens_or_default(), 1000);
    }

    #[test]
    fn test_parse_chat_request_builds_typed_request() {
        let body = json!({
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.2,
            "max_tokens": 256.0
        });
        let request = parse_chat_request(&body).unwrap();

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));

        match parse_chat_request(&json!({})) {
            Err(AppError::Validation(details)) => assert_eq!(details.len(), 1),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_resume_text_boundaries() {
        let at_limit = "r".repeat(MAX_RESUME_TEXT_CHARS);
        assert!(validate_parse_resume_request(&json!({"text": at_limit})).is_empty());

        let over = "r".repeat(MAX_RESUME_TEXT_CHARS + 1);
        assert_eq!(
            validate_parse_resume_request(&json!({"text": over})),
            vec!["text exceeds maximum length of 100000 characters"]
        );

        assert_eq!(
            validate_parse_resume_request(&json!({"text": ""})),
            vec!["text is required and must be a non-empty string"]
        );
        assert_eq!(
            validate_parse_resume_request(&json!({"model": 3})),
            vec!["text is required and must be a non-empty string", "model must be a string"]
        );
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let text = "é".repeat(MAX_RESUME_TEXT_CHARS);
        assert!(text.len() > MAX_RESUME_TEXT_CHARS);
        assert!(validate_parse_resume_request(&json!({"text": text})).is_empty());
    }
}
