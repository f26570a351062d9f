//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code carried in every failure envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    ApiKeyMissing,
    ConfigError,
    OpenrouterError,
    ConnectionError,
    ParseError,
    NotFound,
    ServerError,
    RateLimited,
    PayloadTooLarge,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::ApiKeyMissing => "API_KEY_MISSING",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::OpenrouterError => "OPENROUTER_ERROR",
            ErrorCode::ConnectionError => "CONNECTION_ERROR",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }
}

/// Failure talking to the upstream API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("{message}")]
    Api {
        /// Upstream-provided message or a generic fallback
        message: String,
        /// Upstream HTTP status, passed through to the caller
        status: u16,
    },

    /// Upstream unreachable, timed out, or answered with an undecodable body
    #[error("Failed to connect to AI service: {0}")]
    Connection(String),
}

impl UpstreamError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            UpstreamError::Api { .. } => ErrorCode::OpenrouterError,
            UpstreamError::Connection(_) => ErrorCode::ConnectionError,
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            UpstreamError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed validation; one entry per violation
    #[error("Invalid request")]
    Validation(Vec<String>),

    /// Server transport has no upstream credential
    #[error("API key not configured")]
    ApiKeyMissing,

    /// Function transport has no usable upstream credential
    #[error("Server configuration error: {0}")]
    Config(String),

    /// Upstream API failure
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Model output did not contain a decodable JSON object
    #[error("Failed to parse AI response as JSON")]
    Parse {
        /// Raw model output, echoed for caller-side fallback
        raw_content: String,
    },

    /// Unknown route
    #[error("Endpoint not found")]
    NotFound,

    /// Per-client quota exhausted
    #[error("Too many requests from this IP, please try again later.")]
    RateLimit {
        /// Minutes until the window resets
        retry_after_minutes: u64,
    },

    /// Body exceeded the transport limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Internal server error; the detail is logged, never returned
    #[error("Internal server error")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Error code
    pub code: ErrorCode,
    /// Validation violations (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Raw model output for parse failures (optional)
    #[serde(rename = "rawContent", skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    /// Minutes until the rate-limit window resets (optional)
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ApiKeyMissing | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(e) => e.status_code(),
            AppError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::ApiKeyMissing => ErrorCode::ApiKeyMissing,
            AppError::Config(_) => ErrorCode::ConfigError,
            AppError::Upstream(e) => e.code(),
            AppError::Parse { .. } => ErrorCode::ParseError,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::RateLimit { .. } => ErrorCode::RateLimited,
            AppError::PayloadTooLarge => ErrorCode::PayloadTooLarge,
            AppError::Internal(_) => ErrorCode::ServerError,
        }
    }

    /// Whether the error is worth logging at error level
    pub fn should_log_details(&self) -> bool {
        !matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound
                | AppError::RateLimit { .. }
                | AppError::PayloadTooLarge
        )
    }

    /// Convert to the JSON failure envelope
    pub fn to_error_response(&self) -> ErrorResponse {
        let mut response = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            details: None,
            raw_content: None,
            retry_after: None,
        };

        match self {
            AppError::Validation(violations) => response.details = Some(violations.clone()),
            AppError::Parse { raw_content } => response.raw_content = Some(raw_content.clone()),
            AppError::RateLimit { retry_after_minutes } => {
                response.retry_after = Some(*retry_after_minutes)
            }
            _ => {}
        }

        response
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {} - Status code: {}", detail, status);
            }
            _ if self.should_log_details() => {
                tracing::error!("Application error: {} - Status code: {}", self, status);
            }
            _ => {
                tracing::warn!("Client error: {} - Status code: {}", self.code().as_str(), status);
            }
        }

        let retry_after_secs = match &self {
            AppError::RateLimit { retry_after_minutes } => Some(retry_after_minutes * 60),
            _ => None,
        };

        let mut response = (status, Json(self.to_error_response())).into_response();

        if let Some(secs) = retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ApiKeyMissing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::RateLimit { retry_after_minutes: 15 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Parse { raw_content: String::new() }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        let err = AppError::from(UpstreamError::Api {
            message: "Insufficient credits".to_string(),
            status: 402,
        });
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.code(), ErrorCode::OpenrouterError);
        assert_eq!(err.to_string(), "Insufficient credits");

        let err = AppError::from(UpstreamError::Connection("timed out".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::ConnectionError);
    }

    #[test]
    fn test_envelope_fields() {
        let envelope = AppError::Parse { raw_content: "no json".to_string() }.to_error_response();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["code"], "PARSE_ERROR");
        assert_eq!(json["rawContent"], "no json");
        assert!(json.get("details").is_none());
        assert!(json.get("retryAfter").is_none());
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let envelope = AppError::Internal("db password leaked".to_string()).to_error_response();
        assert_eq!(envelope.error, "Internal server error");
        assert_eq!(envelope.code, ErrorCode::ServerError);
    }

    #[test]
    fn test_code_serialization_matches_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::ApiKeyMissing,
            ErrorCode::OpenrouterError,
            ErrorCode::RateLimited,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }
}
