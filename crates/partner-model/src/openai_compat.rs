// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Shared base implementation for OpenAI-compatible chat completion APIs.
//!
//! OpenAI and OpenRouter speak the same `/chat/completions` SSE wire format.
//! [`OpenAICompatProvider`] holds everything they share; the named drivers
//! only differ in base URL, headers and a few body fields.
//!
//! # Auth styles
//! - `Bearer` – `Authorization: Bearer <key>`
//! - `None` – no authentication (local test servers)

use anyhow::{bail, Context};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::{provider::ResponseStream, CompletionRequest, Message, MessageContent, ResponseEvent};

/// How to send the API key in HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStyle {
    Bearer,
    None,
}

/// OpenAI-compatible chat completion provider.
pub struct OpenAICompatProvider {
    /// Provider id returned by `ModelProvider::name()`.
    driver_name: &'static str,
    model: String,
    api_key: Option<String>,
    /// Full chat completions URL, e.g. `https://openrouter.ai/api/v1/chat/completions`.
    chat_url: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
    /// Additional HTTP headers sent on every request.
    extra_headers: Vec<(String, String)>,
    auth_style: AuthStyle,
    /// Whether `CompletionRequest::cache_key` is forwarded as
    /// `prompt_cache_key`.
    forward_cache_key: bool,
}

impl OpenAICompatProvider {
    /// Construct a provider.
    ///
    /// `base_url` ends **before** `/chat/completions`, e.g.
    /// `https://api.openai.com/v1`.  `max_tokens` defaults to 4096 and
    /// `temperature` to 0.2.
    pub fn new(
        driver_name: &'static str,
        model: String,
        api_key: Option<String>,
        base_url: &str,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        auth_style: AuthStyle,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            driver_name,
            model,
            api_key,
            chat_url: format!("{base}/chat/completions"),
            max_tokens: max_tokens.unwrap_or(4096),
            temperature: temperature.unwrap_or(0.2),
            client: reqwest::Client::new(),
            extra_headers: Vec::new(),
            auth_style,
            forward_cache_key: false,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cache_key_forwarding(mut self) -> Self {
        self.forward_cache_key = true;
        self
    }

    /// Build the JSON request body.  Split out of `complete` so it can be
    /// tested without HTTP.
    pub(crate) fn request_body(&self, req: &CompletionRequest) -> Value {
        let messages = build_openai_messages(&req.messages);
        let tools: Vec<Value> = req
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();

        // OpenAI itself expects "max_completion_tokens"; gateways still use "max_tokens".
        let max_tokens_key = if self.driver_name == "openai" {
            "max_completion_tokens"
        } else {
            "max_tokens"
        };

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": req.stream,
            max_tokens_key: self.max_tokens,
            "temperature": self.temperature,
            "stream_options": { "include_usage": true },
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }
        if self.forward_cache_key {
            if let Some(key) = &req.cache_key {
                body["prompt_cache_key"] = json!(key);
            }
        }
        body
    }
}

#[async_trait]
impl crate::ModelProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        self.driver_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let body = self.request_body(&req);

        debug!(
            driver = %self.driver_name,
            model = %self.model,
            tool_count = req.tools.len(),
            message_count = req.messages.len(),
            "sending completion request"
        );
        trace!(request_body = ?body, "full completion request");

        let mut http_req = self.client.post(&self.chat_url).json(&body);
        http_req = match self.auth_style {
            AuthStyle::Bearer => {
                let key = self
                    .api_key
                    .as_deref()
                    .with_context(|| format!("{} API key not set", self.driver_name))?;
                http_req.bearer_auth(key)
            }
            AuthStyle::None => http_req,
        };
        for (name, val) in &self.extra_headers {
            http_req = http_req.header(name.as_str(), val.as_str());
        }

        let resp = http_req
            .send()
            .await
            .with_context(|| format!("{} request failed", self.driver_name))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("{} error {status}: {text}", self.driver_name);
        }

        // SSE events, and UTF-8 sequences inside them, can be split across
        // TCP packets.  Buffer raw bytes and decode only complete lines.
        let event_stream = resp
            .bytes_stream()
            .scan(Vec::new(), |buf: &mut Vec<u8>, chunk| {
                let events: Vec<anyhow::Result<ResponseEvent>> = match chunk {
                    Ok(b) => {
                        buf.extend_from_slice(&b);
                        drain_complete_sse_lines(buf)
                    }
                    Err(e) => vec![Err(anyhow::anyhow!(e))],
                };
                std::future::ready(Some(events))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

/// Parse a single complete SSE `data:` line.
///
/// Returns `None` for empty lines, comments and unparseable data.
fn parse_sse_data_line(line: &str) -> Option<anyhow::Result<ResponseEvent>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(ResponseEvent::Done));
    }
    let v: Value = serde_json::from_str(data).ok()?;
    Some(parse_sse_chunk(&v))
}

/// Drain all complete `\n`-terminated SSE lines from `buf`, leaving any
/// trailing partial line in place for the next chunk.
pub(crate) fn drain_complete_sse_lines(buf: &mut Vec<u8>) -> Vec<anyhow::Result<ResponseEvent>> {
    let mut events = Vec::new();
    while let Some(nl_pos) = buf.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buf.drain(..=nl_pos).collect();
        let line = String::from_utf8_lossy(&raw[..nl_pos]);
        let line = line.trim_end_matches('\r');
        if let Some(ev) = parse_sse_data_line(line) {
            events.push(ev);
        }
    }
    events
}

fn parse_sse_chunk(v: &Value) -> anyhow::Result<ResponseEvent> {
    // Gateways report upstream failures as an in-band error object.
    if let Some(err) = v.get("error").filter(|e| !e.is_null()) {
        let msg = err["message"].as_str().unwrap_or("unknown provider error");
        bail!("provider stream error: {msg}");
    }

    // Usage-only chunk (stream_options.include_usage = true)
    if let Some(usage) = v.get("usage").filter(|u| !u.is_null()) {
        return Ok(ResponseEvent::Usage {
            input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
        });
    }

    let choice = &v["choices"][0];
    if choice["finish_reason"].as_str() == Some("length") {
        return Ok(ResponseEvent::MaxTokens);
    }

    let delta = &choice["delta"];

    // Parallel tool calls are distinguished by `index`; each chunk carries
    // one delta in practice.
    if let Some(tc) = delta.get("tool_calls").and_then(|t| t.get(0)) {
        let index = tc["index"].as_u64().unwrap_or(0) as u32;
        let id = tc["id"].as_str().unwrap_or("").to_string();
        let name = tc["function"]["name"].as_str().unwrap_or("").to_string();
        let arguments = tc["function"]["arguments"].as_str().unwrap_or("").to_string();
        return Ok(ResponseEvent::ToolCall { index, id, name, arguments });
    }

    if let Some(text) = delta.get("content").and_then(|c| c.as_str()) {
        return Ok(ResponseEvent::TextDelta(text.to_string()));
    }

    Ok(ResponseEvent::TextDelta(String::new()))
}

/// Convert messages into the OpenAI wire-format JSON array.
///
/// Consecutive `ToolCall` messages are merged into one assistant message with
/// a `tool_calls` array, as the API requires for parallel tool calls.
pub(crate) fn build_openai_messages(messages: &[Message]) -> Vec<Value> {
    fn tool_call_to_json(tool_call_id: &str, function: &crate::FunctionCall) -> Value {
        json!({
            "id": tool_call_id,
            "type": "function",
            "function": {
                "name": function.name,
                "arguments": function.arguments,
            }
        })
    }

    let mut result: Vec<Value> = Vec::with_capacity(messages.len());
    let mut iter = messages.iter().peekable();

    while let Some(m) = iter.next() {
        match &m.content {
            MessageContent::ToolCall { tool_call_id, function } => {
                let mut calls = vec![tool_call_to_json(tool_call_id, function)];
                while let Some(MessageContent::ToolCall { tool_call_id, function }) =
                    iter.peek().map(|n| &n.content)
                {
                    calls.push(tool_call_to_json(tool_call_id, function));
                    iter.next();
                }
                result.push(json!({ "role": "assistant", "tool_calls": calls }));
            }
            MessageContent::Text(t) => {
                result.push(json!({ "role": m.role.as_str(), "content": t }));
            }
            MessageContent::ToolResult { tool_call_id, content } => {
                result.push(json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": content,
                }));
            }
        }
    }

    result
}
