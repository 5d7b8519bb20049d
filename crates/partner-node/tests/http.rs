// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use partner_config::{Config, DeploymentConfig};
use partner_core::{AgentFactory, AgentHandle, ConfigurationError, LazyAgent, RunResponse};
use partner_model::Message;
use partner_node::{router, AppState};

/// Replies with the text of the last message, prefixed by the message count.
struct EchoHandle;

#[async_trait]
impl AgentHandle for EchoHandle {
    async fn run(&self, conversation: Vec<Message>) -> anyhow::Result<RunResponse> {
        let last = conversation.last().and_then(|m| m.as_text()).unwrap_or_default().to_string();
        Ok(RunResponse::completed("echo-model", format!("{}:{last}", conversation.len())))
    }
}

struct EchoFactory {
    builds: Arc<AtomicUsize>,
}

#[async_trait]
impl AgentFactory for EchoFactory {
    type Handle = EchoHandle;

    async fn build(&self) -> Result<EchoHandle, ConfigurationError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(EchoHandle)
    }
}

struct NoKeysFactory;

#[async_trait]
impl AgentFactory for NoKeysFactory {
    type Handle = EchoHandle;

    async fn build(&self) -> Result<EchoHandle, ConfigurationError> {
        Err(ConfigurationError::NoModelCredential)
    }
}

struct BrokenHandle;

#[async_trait]
impl AgentHandle for BrokenHandle {
    async fn run(&self, _: Vec<Message>) -> anyhow::Result<RunResponse> {
        Err(anyhow::anyhow!("upstream 500").context("model completion failed"))
    }
}

struct BrokenFactory;

#[async_trait]
impl AgentFactory for BrokenFactory {
    type Handle = BrokenHandle;

    async fn build(&self) -> Result<BrokenHandle, ConfigurationError> {
        Ok(BrokenHandle)
    }
}

fn app<F: AgentFactory>(factory: F) -> (Router, Arc<LazyAgent<F>>) {
    app_with_config(factory, Config::default())
}

fn app_with_config<F: AgentFactory>(factory: F, config: Config) -> (Router, Arc<LazyAgent<F>>) {
    let agent = Arc::new(LazyAgent::new(factory));
    (router(AppState::new(Arc::clone(&agent), config)), agent)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.expect("app should handle request");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .expect("response body should be readable");
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, payload: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .expect("request build should succeed")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request build should succeed")
}

#[tokio::test]
async fn messages_returns_run_response() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (app, _) = app(EchoFactory { builds: Arc::clone(&builds) });
    let payload = json!({"messages": [
        {"role": "user", "content": "I need running shoes"},
        {"role": "assistant", "content": "What size?"},
        {"role": "user", "content": "size 10"},
    ]});

    let (status, body) = send(app, post_json("/messages", payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["content"], "3:size 10");
    assert_eq!(body["model"], "echo-model");
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_does_not_construct_agent() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (app, agent) = app(EchoFactory { builds: Arc::clone(&builds) });

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agent_ready"], false);
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(builds.load(Ordering::SeqCst), 0);

    let payload = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, _) = send(app.clone(), post_json("/messages", payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(agent.is_ready());

    let (_, body) = send(app, get("/health")).await;
    assert_eq!(body["agent_ready"], true);
}

#[tokio::test]
async fn missing_credentials_is_service_unavailable() {
    let (app, agent) = app(NoKeysFactory);
    let payload = json!({"messages": [{"role": "user", "content": "hi"}]});

    let (status, body) = send(app, post_json("/messages", payload.to_string())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("OPENAI_API_KEY"), "{msg}");
    assert!(!agent.is_ready());
}

#[tokio::test]
async fn agent_failure_is_bad_gateway() {
    let (app, _) = app(BrokenFactory);
    let payload = json!({"messages": [{"role": "user", "content": "hi"}]});

    let (status, body) = send(app, post_json("/messages", payload.to_string())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "model completion failed: upstream 500");
}

#[tokio::test]
async fn malformed_body_is_rejected_with_json_error() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (app, _) = app(EchoFactory { builds: Arc::clone(&builds) });

    let (status, body) = send(app, post_json("/messages", "{not json".into())).await;

    assert!(status.is_client_error(), "{status}");
    assert!(body["error"].is_string());
    assert_eq!(builds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_messages_field_is_unprocessable() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (app, _) = app(EchoFactory { builds });

    let (status, body) = send(app, post_json("/messages", json!({"msgs": []}).to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (app, _) = app(EchoFactory { builds: Arc::clone(&builds) });
    let huge = "x".repeat(partner_node::MAX_BODY_BYTES + 1);
    let payload = json!({"messages": [{"role": "user", "content": huge}]}).to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/messages")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();

    let (status, _) = send(app, req).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(builds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn agent_card_reflects_config() {
    let config = Config {
        name: "mall-helper".into(),
        deployment: DeploymentConfig {
            url: "http://0.0.0.0:8080".into(),
            protocol_version: "2.0.0".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    let (app, _) = app_with_config(NoKeysFactory, config);

    let (status, body) = send(app, get("/.well-known/agent.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "mall-helper");
    assert_eq!(body["url"], "http://0.0.0.0:8080");
    assert_eq!(body["protocol_version"], "2.0.0");
    assert_eq!(body["capabilities"]["streaming"], false);
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let (app, _) = app(NoKeysFactory);
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://shop.example.com")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
}

#[tokio::test]
async fn cors_echoes_listed_origin_only() {
    let config = Config {
        deployment: DeploymentConfig {
            cors_origins: vec!["https://shop.example.com".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let (app, _) = app_with_config(NoKeysFactory, config);

    let allowed = Request::builder()
        .uri("/health")
        .header("origin", "https://shop.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://shop.example.com"
    );

    let other = Request::builder()
        .uri("/health")
        .header("origin", "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(other).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
