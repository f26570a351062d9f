//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic and the router that wires them together

pub mod chat;
pub mod extract;
pub mod health;
pub mod models;
pub mod resume;

use crate::config::{DeploymentMode, Settings};
use crate::middleware::{rate_limit_middleware, request_logging_middleware};
use crate::services::{FixedWindowRateLimiter, OpenRouterClient, RateLimiter, Upstream};
use crate::utils::error::{AppError, AppResult};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Path prefix grouping every proxy route
pub const API_PREFIX: &str = "/api";

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub upstream: Arc<dyn Upstream>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Build state with the OpenRouter client and an in-memory limiter
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let upstream = Arc::new(OpenRouterClient::new(settings.upstream.clone())?);
        let rate_limiter = Arc::new(FixedWindowRateLimiter::from_config(&settings.rate_limit));

        Ok(Self {
            settings,
            upstream,
            rate_limiter,
        })
    }
}

/// Create application router
pub fn create_router(settings: Settings) -> Result<Router> {
    Ok(build_router(AppState::from_settings(settings)?))
}

/// Create the router around an existing state
pub fn build_router(state: AppState) -> Router {
    let max_request_size = state.settings.request.max_request_size;
    let cors = cors_layer(&state.settings);
    let state = Arc::new(state);

    let api = Router::new()
        .route("/health", get(health::health_check).fallback(not_found))
        .route("/models", get(models::list_models).fallback(not_found))
        .route("/chat", post(chat::handle_chat).fallback(not_found))
        .route("/parse-resume", post(resume::handle_parse_resume).fallback(not_found))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_request_size));

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware_stack)
}

/// Fail fast when no upstream credential is configured
///
/// The error code depends on how the surface is hosted.
pub fn require_api_key(settings: &Settings) -> AppResult<()> {
    if settings.api_configured() {
        return Ok(());
    }

    warn!("Upstream API key is not configured");
    match settings.server.mode {
        DeploymentMode::Server => Err(AppError::ApiKeyMissing),
        DeploymentMode::Function => Err(AppError::Config("API key not configured".to_string())),
    }
}

/// Unknown route
pub async fn not_found() -> AppError {
    AppError::NotFound
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if settings.allows_any_origin() {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = settings
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}
