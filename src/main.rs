//! OpenRouter Proxy Server
//! 
//! HTTP proxy service that forwards chat and resume parsing requests to OpenRouter

use anyhow::{Context, Result};
use openrouter_proxy::{transport, utils::logging::init_logging, version_info, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings from .env and the environment
    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings.logging).context("Failed to initialize logging")?;

    info!("{}", version_info());
    info!(
        "Deployment mode: {}, rate limit: {} requests per {} minutes",
        settings.server.mode,
        settings.rate_limit.max_requests,
        settings.rate_limit_window_minutes()
    );

    transport::serve(settings).await
}
