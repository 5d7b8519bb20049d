// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! HTTP host for the shopping partner.
//!
//! Owns the process-wide [`partner_core::LazyAgent`] and exposes it over
//! axum: `POST /messages` dispatches a conversation, `GET /health` reports
//! readiness without constructing the agent, and
//! `GET /.well-known/agent.json` serves the agent card built from the
//! configuration record.

pub mod error;
pub mod http;
pub mod server;

pub use error::{ApiError, NodeError};
pub use http::{router, AgentCard, AppState, MessagesRequest, MAX_BODY_BYTES};
pub use server::{serve, shutdown_signal};
