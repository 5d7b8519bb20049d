// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use partner_core::DispatchError;

/// Startup and serving failures of the host.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid deployment url: {0}")]
    InvalidUrl(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error half of a route result.  Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The agent could not be built from the current credentials.
    #[error("{0}")]
    Unavailable(String),

    /// The model or a tool backend failed while answering.
    #[error("{0}")]
    Upstream(String),

    /// The request body was not a valid `{"messages": [...]}` document.
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (code, body).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Configuration(c) => ApiError::Unavailable(c.to_string()),
            // Keep the whole cause chain; the caller has nothing else to go on.
            DispatchError::Downstream(e) => ApiError::Upstream(format!("{e:#}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError::BadRequest { status: r.status(), message: r.body_text() }
    }
}
