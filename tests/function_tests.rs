//! Function transport tests
//!
//! The per-invocation adapter shares the router with the server transport but
//! uses relaxed CORS and the stricter credential check

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
};
use axum_test::TestServer;
use httpmock::prelude::*;
use openrouter_proxy::config::Settings;
use openrouter_proxy::handlers::{build_router, AppState};
use openrouter_proxy::transport::{self, FunctionHandler};
use serde_json::{json, Value};
use std::collections::HashMap;

fn function_settings(pairs: &[(&str, &str)]) -> Settings {
    let mut vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert("DEPLOYMENT_MODE".to_string(), "function".to_string());
    Settings::from_lookup(|key| vars.get(key).cloned()).expect("Failed to create function settings")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_in_function_mode() {
    let settings = function_settings(&[("OPENROUTER_API_KEY", "sk-or-v1-function-test-key")]);
    let server = TestServer::new(build_router(AppState::from_settings(settings).unwrap())).unwrap();

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["apiConfigured"], true);
}

#[tokio::test]
async fn test_missing_key_is_a_config_error() {
    let handler = FunctionHandler::new(function_settings(&[])).unwrap();

    let response = handler
        .handle(post_json(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "Hello"}]}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["code"], "CONFIG_ERROR");
    assert_eq!(body["error"], "Server configuration error: API key not configured");
}

#[tokio::test]
async fn test_implausibly_short_key_is_rejected() {
    let handler = FunctionHandler::new(function_settings(&[("OPENROUTER_API_KEY", "sk-short")])).unwrap();

    let response = handler
        .handle(Request::builder().uri("/api/models").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_any_origin_is_allowed() {
    let settings = function_settings(&[("OPENROUTER_API_KEY", "sk-or-v1-function-test-key")]);
    let server = TestServer::new(build_router(AppState::from_settings(settings).unwrap())).unwrap();

    let response = server
        .get("/api/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://resume.example.net"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
}

#[tokio::test]
async fn test_chat_round_trip_through_handler() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("x-title", "Resume Studio");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello from upstream"}}]
            }));
        })
        .await;

    let base_url = server.base_url();
    let handler = FunctionHandler::new(function_settings(&[
        ("OPENROUTER_API_KEY", "sk-or-v1-function-test-key"),
        ("OPENROUTER_BASE_URL", base_url.as_str()),
        ("APP_TITLE", "Resume Studio"),
    ]))
    .unwrap();

    let response = handler
        .handle(post_json(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "Hello"}], "model": "openai/gpt-4o-mini"}),
        ))
        .await;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["content"], "Hello from upstream");
    assert_eq!(body["model"], "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_rate_limit_persists_across_invocations() {
    let handler = FunctionHandler::new(function_settings(&[
        ("OPENROUTER_API_KEY", "sk-or-v1-function-test-key"),
        ("RATE_LIMIT_MAX_REQUESTS", "2"),
        ("RATE_LIMIT_WINDOW_SECS", "60"),
    ]))
    .unwrap();

    let request = || {
        Request::builder()
            .uri("/api/health")
            .header("x-forwarded-for", "203.0.113.44")
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(handler.handle(request()).await.status(), StatusCode::OK);
    assert_eq!(handler.handle(request()).await.status(), StatusCode::OK);

    let response = handler.handle(request()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(read_json(response).await["retryAfter"], 1);
}

#[tokio::test]
async fn test_larger_bodies_are_accepted_in_function_mode() {
    let handler = FunctionHandler::new(function_settings(&[])).unwrap();

    // Over the server default of 1 MiB, under the function default of 5 MiB
    let text = "a".repeat(2 * 1024 * 1024);
    let response = handler
        .handle(post_json("/api/parse-resume", json!({ "text": text })))
        .await;

    // Reaches the handler, which then reports the missing key
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_global_invoke_serves_health() {
    let response = transport::invoke(Request::builder().uri("/api/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
}
