// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, required_str, result_count};
use crate::tool::{Tool, ToolCall, ToolOutput};

pub const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// Keyless web search backed by the DuckDuckGo Instant Answer API.
pub struct DuckDuckGoSearchTool {
    endpoint: String,
}

impl Default for DuckDuckGoSearchTool {
    fn default() -> Self {
        Self { endpoint: DUCKDUCKGO_API_URL.into() }
    }
}

impl DuckDuckGoSearchTool {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search DuckDuckGo. Returns the instant-answer abstract (when there is \
         one) followed by related results with links. max_results: 1-10 (default 5)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of related results to return (default 5, max 10)"
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
        let count = result_count(&call.args, "max_results", 5);

        debug!(query = %query, count, "duckduckgo_search tool");

        ToolOutput::from_result(&call.id, "duckduckgo search error", self.search(query, count).await)
    }
}

impl DuckDuckGoSearchTool {
    async fn search(&self, query: &str, count: usize) -> anyhow::Result<String> {
        let resp = http_client()?
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("DuckDuckGo returned status {}", resp.status());
        }

        // The API answers with `application/x-javascript`, so parse the text.
        let text = resp.text().await?;
        let json: Value = serde_json::from_str(&text)?;
        Ok(format_results(&json, count))
    }
}

/// Flatten `RelatedTopics`, which nests grouped topics under `Topics`.
fn related_topics(json: &Value) -> Vec<(&str, &str)> {
    fn collect<'a>(items: &'a [Value], out: &mut Vec<(&'a str, &'a str)>) {
        for item in items {
            if let Some(nested) = item.get("Topics").and_then(|t| t.as_array()) {
                collect(nested, out);
                continue;
            }
            let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
            let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
            if !text.is_empty() {
                out.push((text, url));
            }
        }
    }

    let mut out = Vec::new();
    if let Some(items) = json.get("RelatedTopics").and_then(|r| r.as_array()) {
        collect(items, &mut out);
    }
    out
}

fn format_results(json: &Value, count: usize) -> String {
    let mut sections = Vec::new();

    let abstract_text = json.get("AbstractText").and_then(|v| v.as_str()).unwrap_or("");
    if !abstract_text.is_empty() {
        let heading = json.get("Heading").and_then(|v| v.as_str()).unwrap_or("Summary");
        let source = json.get("AbstractURL").and_then(|v| v.as_str()).unwrap_or("");
        sections.push(format!("**{heading}**\n{abstract_text}\n{source}").trim_end().to_string());
    }

    for (i, (text, url)) in related_topics(json).into_iter().take(count).enumerate() {
        sections.push(format!("{}. {}\n   {}", i + 1, text, url).trim_end().to_string());
    }

    if sections.is_empty() {
        return "(no results)".to_string();
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_query() {
        let schema = DuckDuckGoSearchTool::default().parameters_schema();
        assert_eq!(schema["required"], json!(["query"]));
        assert!(schema["properties"]["max_results"].is_object());
    }

    #[tokio::test]
    async fn missing_query_is_error_output() {
        let call = ToolCall {
            id: "7".into(),
            name: "duckduckgo_search".into(),
            args: json!({"max_results": 3}),
        };
        let out = DuckDuckGoSearchTool::default().execute(&call).await;
        assert!(out.is_error);
        assert_eq!(out.call_id, "7");
    }

    #[test]
    fn formats_abstract_and_nested_topics() {
        let json = json!({
            "Heading": "Running shoe",
            "AbstractText": "A running shoe is designed for running.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Running_shoe",
            "RelatedTopics": [
                { "Text": "Trail running shoe", "FirstURL": "https://duckduckgo.com/Trail" },
                { "Name": "Brands", "Topics": [
                    { "Text": "Nike", "FirstURL": "https://duckduckgo.com/Nike" },
                    { "Text": "Asics", "FirstURL": "https://duckduckgo.com/Asics" }
                ]}
            ]
        });
        let out = format_results(&json, 2);
        assert!(out.starts_with("**Running shoe**"));
        assert!(out.contains("1. Trail running shoe"));
        assert!(out.contains("2. Nike"));
        assert!(!out.contains("Asics"));
    }

    #[test]
    fn no_abstract_no_topics_is_no_results() {
        assert_eq!(format_results(&json!({"AbstractText": "", "RelatedTopics": []}), 5), "(no results)");
    }
}
