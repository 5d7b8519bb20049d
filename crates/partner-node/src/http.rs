// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{debug, warn};

use partner_config::{Config, DeploymentConfig, EnvVarSpec};
use partner_core::{AgentFactory, LazyAgent, RunResponse};
use partner_model::Message;

use crate::error::ApiError;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state of every route.
pub struct AppState<F: AgentFactory> {
    pub agent: Arc<LazyAgent<F>>,
    pub config: Arc<Config>,
}

// Manual impl: `F` itself need not be `Clone`.
impl<F: AgentFactory> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self { agent: Arc::clone(&self.agent), config: Arc::clone(&self.config) }
    }
}

impl<F: AgentFactory> AppState<F> {
    pub fn new(agent: Arc<LazyAgent<F>>, config: Config) -> Self {
        Self { agent, config: Arc::new(config) }
    }
}

/// Body of `POST /messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

/// Public description of the agent served at `/.well-known/agent.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub protocol_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub capabilities: CardCapabilities,
    pub environment_variables: Vec<EnvVarSpec>,
}

impl AgentCard {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            version: config.version.clone(),
            url: config.deployment.url.clone(),
            protocol_version: config.deployment.protocol_version.clone(),
            author: config.author.clone(),
            capabilities: CardCapabilities { streaming: false, push_notifications: false },
            environment_variables: config.environment_variables.clone(),
        }
    }
}

/// Build the application router with CORS and the body limit applied.
pub fn router<F: AgentFactory>(state: AppState<F>) -> Router {
    let cors = cors_layer(&state.config.deployment);
    Router::new()
        .route("/messages", post(post_messages::<F>))
        .route("/health", get(health::<F>))
        .route("/.well-known/agent.json", get(agent_card::<F>))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

fn cors_layer(deployment: &DeploymentConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if deployment.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = deployment
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn post_messages<F: AgentFactory>(
    State(state): State<AppState<F>>,
    body: Result<Json<MessagesRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(req) = body?;
    debug!(message_count = req.messages.len(), "dispatching conversation");
    match state.agent.dispatch(req.messages).await {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => {
            warn!("dispatch failed: {e:#}");
            Err(e.into())
        }
    }
}

async fn health<F: AgentFactory>(State(state): State<AppState<F>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "agent_ready": state.agent.is_ready(),
        "version": state.config.version,
    }))
}

async fn agent_card<F: AgentFactory>(State(state): State<AppState<F>>) -> Json<AgentCard> {
    Json(AgentCard::from_config(&state.config))
}
