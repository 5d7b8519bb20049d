// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, required_str, result_count, truncate_chars};
use crate::tool::{Tool, ToolCall, ToolOutput};

pub const EXA_SEARCH_URL: &str = "https://api.exa.ai/search";

const SNIPPET_CHARS: usize = 400;

/// Neural web search through the Exa API.  Selected when `EXA_API_KEY` is set.
pub struct ExaSearchTool {
    api_key: String,
    endpoint: String,
}

impl ExaSearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), endpoint: EXA_SEARCH_URL.into() }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Tool for ExaSearchTool {
    fn name(&self) -> &str {
        "exa_search"
    }

    fn description(&self) -> &str {
        "Search the web with Exa. Returns title, URL, publish date and a text \
         snippet for each hit. num_results: 1-10 (default 5).\n\
         Prefer queries that name trusted retailers (Amazon, Flipkart, Myntra, \
         Meesho, Google Shopping, official brand stores)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 5, max 10)"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let Some(query) = required_str(&call.args, "query") else {
            return ToolOutput::err(&call.id, "missing 'query'");
        };
        let count = result_count(&call.args, "num_results", 5);

        debug!(query = %query, count, "exa_search tool");

        ToolOutput::from_result(&call.id, "exa search error", self.search(query, count).await)
    }
}

impl ExaSearchTool {
    async fn search(&self, query: &str, count: usize) -> anyhow::Result<String> {
        let body = json!({
            "query": query,
            "numResults": count,
            "contents": { "text": { "maxCharacters": SNIPPET_CHARS * 2 } },
        });

        let resp = http_client()?
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Exa API returned status {status}: {text}");
        }

        let json: Value = resp.json().await?;
        Ok(format_results(&json, count))
    }
}

fn format_results(json: &Value, count: usize) -> String {
    let results = json
        .get("results")
        .and_then(|r| r.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or(&[]);

    if results.is_empty() {
        return "(no results)".to_string();
    }

    let mut output = Vec::new();
    for (i, r) in results.iter().enumerate().take(count) {
        let title = r.get("title").and_then(|v| v.as_str()).unwrap_or("(no title)");
        let url = r.get("url").and_then(|v| v.as_str()).unwrap_or("");
        let mut entry = format!("{}. **{}**\n   {}", i + 1, title, url);
        if let Some(date) = r.get("publishedDate").and_then(|v| v.as_str()) {
            entry.push_str(&format!("\n   Published: {date}"));
        }
        if let Some(text) = r.get("text").and_then(|v| v.as_str()).filter(|t| !t.is_empty()) {
            let snippet = truncate_chars(&text.split_whitespace().collect::<Vec<_>>().join(" "), SNIPPET_CHARS);
            entry.push_str(&format!("\n   {snippet}"));
        }
        output.push(entry);
    }

    output.join("\n\n")
}
