//! Per-invocation transport
//!
//! Adapts the router to serverless runtimes that hand over one request at a
//! time. The router, and with it the rate limiter, is built once per warm
//! instance and reused across invocations.

use crate::config::Settings;
use crate::handlers::{build_router, AppState};
use crate::utils::error::AppError;
use crate::utils::logging::init_logging;
use anyhow::Result;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use once_cell::sync::OnceCell;
use tower::ServiceExt;
use tracing::error;

static HANDLER: OnceCell<FunctionHandler> = OnceCell::new();

/// Router wrapper answering single requests
#[derive(Debug, Clone)]
pub struct FunctionHandler {
    router: Router,
}

impl FunctionHandler {
    /// Build a handler from explicit settings
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self::with_state(AppState::from_settings(settings)?))
    }

    /// Build a handler around an existing state
    pub fn with_state(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// Build a handler from the environment, forcing function mode
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = Settings::from_lookup(|key| match key {
            "DEPLOYMENT_MODE" => Some("function".to_string()),
            _ => std::env::var(key).ok(),
        })?;

        // A host runtime may already own the global subscriber
        let _ = init_logging(&settings.logging);

        Self::new(settings)
    }

    /// Answer one request
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

/// Answer one request with the process-wide handler
///
/// Configuration failures are reported per request as `CONFIG_ERROR`.
pub async fn invoke(request: Request<Body>) -> Response {
    match HANDLER.get_or_try_init(FunctionHandler::from_env) {
        Ok(handler) => handler.handle(request).await,
        Err(e) => {
            error!("Failed to initialize function handler: {:#}", e);
            AppError::Config(e.to_string()).into_response()
        }
    }
}
