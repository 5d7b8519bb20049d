// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Long-term user memory through the Mem0 platform API.
//!
//! Lets the agent remember preferences (sizes, budgets, favourite brands)
//! across conversations.  Only registered when `MEM0_API_KEY` is set.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, required_str};
use crate::tool::{Tool, ToolCall, ToolOutput};

pub const MEM0_API_URL: &str = "https://api.mem0.ai";

/// Memory namespace used when the model does not pass `user_id`.
pub const DEFAULT_MEM0_USER_ID: &str = "shopping-partner";

pub struct Mem0Tool {
    api_key: String,
    base_url: String,
}

impl Mem0Tool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: MEM0_API_URL.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// A parsed, validated memory request.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation<'a> {
    Add { content: &'a str },
    Search { query: &'a str },
    List,
    DeleteAll,
}

fn parse_operation(args: &Value) -> Result<Operation<'_>, String> {
    let op = args
        .get("operation")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "missing 'operation'".to_string())?;
    match op {
        "add" => required_str(args, "content")
            .map(|content| Operation::Add { content })
            .ok_or_else(|| "'content' is required for add".to_string()),
        "search" => required_str(args, "query")
            .map(|query| Operation::Search { query })
            .ok_or_else(|| "'query' is required for search".to_string()),
        "list" => Ok(Operation::List),
        "delete_all" => Ok(Operation::DeleteAll),
        other => Err(format!("unknown operation '{other}' (expected add, search, list or delete_all)")),
    }
}

#[async_trait]
impl Tool for Mem0Tool {
    fn name(&self) -> &str {
        "mem0_memory"
    }

    fn description(&self) -> &str {
        "Persistent memory of the user's shopping preferences. Operations: add \
         (store content), search (find memories relevant to query), list (all \
         memories), delete_all (forget everything for the user)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "search", "list", "delete_all"],
                    "description": "Memory operation to perform"
                },
                "content": {
                    "type": "string",
                    "description": "Fact to remember (required for add)"
                },
                "query": {
                    "type": "string",
                    "description": "What to look for (required for search)"
                },
                "user_id": {
                    "type": "string",
                    "description": "Memory namespace (default: shopping-partner)"
                }
            },
            "required": ["operation"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let op = match parse_operation(&call.args) {
            Ok(op) => op,
            Err(msg) => return ToolOutput::err(&call.id, msg),
        };
        let user_id = required_str(&call.args, "user_id").unwrap_or(DEFAULT_MEM0_USER_ID);

        debug!(?op, user_id, "mem0_memory tool");

        ToolOutput::from_result(&call.id, "mem0 error", self.run(op, user_id).await)
    }
}

impl Mem0Tool {
    async fn run(&self, op: Operation<'_>, user_id: &str) -> anyhow::Result<String> {
        let client = http_client()?;
        let auth = format!("Token {}", self.api_key);

        let req = match op {
            Operation::Add { content } => client.post(self.url("/v1/memories/")).json(&json!({
                "messages": [{ "role": "user", "content": content }],
                "user_id": user_id,
            })),
            Operation::Search { query } => client
                .post(self.url("/v1/memories/search/"))
                .json(&json!({ "query": query, "user_id": user_id })),
            Operation::List => client.get(self.url("/v1/memories/")).query(&[("user_id", user_id)]),
            Operation::DeleteAll => client.delete(self.url("/v1/memories/")).query(&[("user_id", user_id)]),
        };

        let resp = req.header("Authorization", auth).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mem0 API returned status {status}: {text}");
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Ok(match op {
            Operation::Add { .. } => "Memory stored.".to_string(),
            Operation::DeleteAll => format!("All memories for '{user_id}' deleted."),
            Operation::Search { .. } | Operation::List => format_memories(&body),
        })
    }
}

/// Render a list or search response.  Mem0 returns either a bare array or an
/// object with a `results` array depending on the endpoint version.
fn format_memories(body: &Value) -> String {
    let items = body
        .as_array()
        .or_else(|| body.get("results").and_then(|r| r.as_array()))
        .map(|a| a.as_slice())
        .unwrap_or(&[]);

    let lines: Vec<String> = items
        .iter()
        .filter_map(|m| m.get("memory").and_then(|v| v.as_str()))
        .map(|m| format!("- {m}"))
        .collect();

    if lines.is_empty() {
        "(no memories)".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_operation() {
        assert_eq!(
            parse_operation(&json!({"operation": "add", "content": "size 42"})),
            Ok(Operation::Add { content: "size 42" })
        );
        assert_eq!(
            parse_operation(&json!({"operation": "search", "query": "shoe size"})),
            Ok(Operation::Search { query: "shoe size" })
        );
        assert_eq!(parse_operation(&json!({"operation": "list"})), Ok(Operation::List));
        assert_eq!(parse_operation(&json!({"operation": "delete_all"})), Ok(Operation::DeleteAll));
    }

    #[test]
    fn rejects_incomplete_requests() {
        assert!(parse_operation(&json!({})).is_err());
        assert!(parse_operation(&json!({"operation": "add"})).is_err());
        assert!(parse_operation(&json!({"operation": "search", "query": " "})).is_err());
        let err = parse_operation(&json!({"operation": "forget"})).unwrap_err();
        assert!(err.contains("unknown operation"));
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_output() {
        let t = Mem0Tool::new("m0-test");
        let call = ToolCall { id: "m".into(), name: "mem0_memory".into(), args: json!({"operation": "add"}) };
        let out = t.execute(&call).await;
        assert!(out.is_error);
        assert!(out.content.contains("content"));
    }

    #[test]
    fn formats_both_response_shapes() {
        let bare = json!([{ "id": "1", "memory": "Prefers Nike" }, { "id": "2", "memory": "Budget 5000 INR" }]);
        assert_eq!(format_memories(&bare), "- Prefers Nike\n- Budget 5000 INR");
        let wrapped = json!({ "results": [{ "memory": "Size 9" }] });
        assert_eq!(format_memories(&wrapped), "- Size 9");
        assert_eq!(format_memories(&Value::Null), "(no memories)");
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        let t = Mem0Tool::new("k").with_base_url("http://localhost:8000/");
        assert_eq!(t.url("/v1/memories/"), "http://localhost:8000/v1/memories/");
    }
}
