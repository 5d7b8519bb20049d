// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{Tool, ToolCall, ToolOutput};

/// Function definition offered to the model.  Mirrors
/// `partner_model::ToolSchema` so this crate does not depend on the model
/// crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tools of one agent instance, in the order the capability selector added
/// them (search before memory).  Read-only once the agent is built.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    /// Add `tool`, replacing an earlier tool of the same name in place.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Run `call` against the named tool.
    ///
    /// Unknown tools and arguments missing a `required` schema property are
    /// answered with an error output without invoking the tool.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let Some(tool) = self.get(&call.name) else {
            return ToolOutput::err(&call.id, format!("unknown tool: {}", call.name));
        };
        let missing = missing_required(&tool.parameters_schema(), &call.args);
        if !missing.is_empty() {
            debug!(tool = %call.name, ?missing, "rejecting tool call with missing arguments");
            return ToolOutput::err(
                &call.id,
                format!("missing required argument(s) for {}: {}", call.name, missing.join(", ")),
            );
        }
        tool.execute(call).await
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// `required` properties of a JSON schema that are absent or null in `args`.
fn missing_required(schema: &Value, args: &Value) -> Vec<String> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Vec::new();
    };
    required
        .iter()
        .filter_map(Value::as_str)
        .filter(|key| args.get(*key).map_or(true, Value::is_null))
        .map(str::to_string)
        .collect()
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
