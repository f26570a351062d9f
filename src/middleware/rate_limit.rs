//! Rate limiting middleware
//!
//! Admits or rejects each request under the API prefix before it reaches a handler

use crate::handlers::AppState;
use crate::services::RateDecision;
use crate::utils::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate limiting middleware
///
/// Keyed by client IP; rejected requests never reach the upstream client.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_id = client_identifier(request.headers(), peer, state.settings.security.trust_proxy);

    let decision = state.rate_limiter.check(&client_id);

    let mut response = if decision.allowed {
        debug!("Client {} admitted, {} requests remaining", client_id, decision.remaining);
        next.run(request).await
    } else {
        warn!("Client {} exceeded rate limit", client_id);
        AppError::RateLimit {
            retry_after_minutes: state.settings.rate_limit_window_minutes(),
        }
        .into_response()
    };

    apply_rate_limit_headers(response.headers_mut(), &decision);
    response
}

/// Resolve the client IP
///
/// Forwarded headers are only honoured when the deployment sits behind a
/// trusted proxy; otherwise the socket peer is the identity.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_client(headers) {
            return ip;
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded_for) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded_for.split(',').next().map(str::trim) {
            if !ip.is_empty() && ip != "unknown" {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Add `RateLimit-*` headers describing the caller's window
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    let values = [
        ("ratelimit-limit", decision.limit as u64),
        ("ratelimit-remaining", decision.remaining as u64),
        ("ratelimit-reset", decision.reset_after.as_secs()),
    ];

    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}
