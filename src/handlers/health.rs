//! Health check handler
//!
//! Reports liveness and whether the upstream credential is configured

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, always `ok`
    pub status: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    /// Whether an upstream credential is available
    #[serde(rename = "apiConfigured")]
    pub api_configured: bool,
}

/// Basic health check
///
/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        api_configured: state.settings.api_configured(),
    })
}
