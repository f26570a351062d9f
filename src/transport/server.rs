//! Long-running server transport
//!
//! Binds a TCP listener and serves the router until Ctrl-C or SIGTERM

use crate::config::Settings;
use crate::handlers::{create_router, API_PREFIX};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Serve the proxy on the configured host and port
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_on(listener, settings).await
}

/// Serve the proxy on an already bound listener
pub async fn serve_on(listener: TcpListener, settings: Settings) -> Result<()> {
    if !settings.api_configured() {
        warn!("OPENROUTER_API_KEY is not set; upstream routes will answer with API_KEY_MISSING");
    }

    let app = create_router(settings).context("Failed to build router")?;
    let addr = listener.local_addr().context("Failed to read listener address")?;

    info!("🚀 OpenRouter proxy started on http://{}", addr);
    info!("📝 Health check: http://{}{}/health", addr, API_PREFIX);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
