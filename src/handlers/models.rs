//! Model listing handler

use crate::handlers::{require_api_key, AppState};
use crate::models::api::ModelsResponse;
use crate::services::reshaper;
use crate::utils::error::AppResult;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

/// List upstream models, free first
///
/// GET /api/models
pub async fn list_models(State(state): State<Arc<AppState>>) -> AppResult<Json<ModelsResponse>> {
    require_api_key(&state.settings)?;

    let models = state.upstream.list_models().await?;
    debug!("Upstream returned {} models", models.len());

    Ok(Json(reshaper::summarize_models(models)))
}
