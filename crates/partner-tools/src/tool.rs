// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::Value;

/// One function call the model asked for during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned id; results are matched back to the call by it.
    pub id: String,
    pub name: String,
    /// Always a JSON object; unparseable arguments arrive as `{}`.
    pub args: Value,
}

/// What a tool hands back to the model.
///
/// Failures are ordinary outputs with `is_error` set: the model sees the
/// message and can retry or answer without the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: content.into(), is_error: false }
    }

    pub fn err(call_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: msg.into(), is_error: true }
    }

    /// Map a backend result to an output, prefixing errors with `label` and
    /// keeping their full cause chain.
    pub fn from_result(call_id: &str, label: &str, result: anyhow::Result<String>) -> Self {
        match result {
            Ok(text) => Self::ok(call_id, text),
            Err(e) => Self::err(call_id, format!("{label}: {e:#}")),
        }
    }
}

/// A capability the agent can offer the model (search, memory).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name exposed to the model.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object.  Properties listed in
    /// `required` are checked by the registry before `execute` runs.
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, call: &ToolCall) -> ToolOutput;
}
