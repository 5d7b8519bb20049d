// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use crate::{provider::ResponseStream, CompletionRequest, ResponseEvent};

/// Deterministic mock provider for tests.  Echoes the last user message
/// back as the assistant response.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl crate::ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let reply = req
            .messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, crate::Role::User))
            .and_then(|m| m.as_text())
            .unwrap_or("[no input]")
            .to_string();

        let events: Vec<anyhow::Result<ResponseEvent>> = vec![
            Ok(ResponseEvent::TextDelta(format!("MOCK: {reply}"))),
            Ok(ResponseEvent::Usage { input_tokens: 10, output_tokens: 10 }),
            Ok(ResponseEvent::Done),
        ];
        Ok(Box::pin(stream::iter(events)))
    }
}

/// One scripted reply: either an event sequence or a request failure.
enum Script {
    Events(Vec<ResponseEvent>),
    Fail(String),
}

/// A pre-scripted mock provider.  Each call to `complete` pops the next
/// script from the front of the queue, so tests can specify exact event
/// sequences (tool calls included) without network access.
pub struct ScriptedMockProvider {
    scripts: Mutex<VecDeque<Script>>,
    model: String,
    /// Every `CompletionRequest` seen by this provider, in call order.
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedMockProvider {
    /// The outer `Vec` is the ordered list of calls; the inner `Vec` is the
    /// sequence of [`ResponseEvent`]s emitted for that call.
    pub fn new(scripts: Vec<Vec<ResponseEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(Script::Events).collect()),
            model: "scripted-mock-model".into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that always returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![vec![
            ResponseEvent::TextDelta(reply.into()),
            ResponseEvent::Usage { input_tokens: 5, output_tokens: 5 },
            ResponseEvent::Done,
        ]])
    }

    /// Provider that returns a tool call followed by a text reply.
    pub fn tool_then_text(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        args_json: impl Into<String>,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            vec![
                ResponseEvent::ToolCall {
                    index: 0,
                    id: tool_id.into(),
                    name: tool_name.into(),
                    arguments: args_json.into(),
                },
                ResponseEvent::Done,
            ],
            vec![ResponseEvent::TextDelta(final_text.into()), ResponseEvent::Done],
        ])
    }

    /// Provider whose first request fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let p = Self::new(vec![]);
        p.push_failure(message);
        p
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut s) = self.scripts.lock() {
            s.push_back(Script::Fail(message.into()));
        }
    }

    /// Snapshot of the recorded requests.
    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl crate::ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        "scripted-mock"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(req);
        }
        let next = self.scripts.lock().ok().and_then(|mut s| s.pop_front());
        let events = match next {
            Some(Script::Events(events)) => events,
            Some(Script::Fail(msg)) => anyhow::bail!(msg),
            None => vec![ResponseEvent::TextDelta("[no more scripts]".into()), ResponseEvent::Done],
        };
        let wrapped: Vec<anyhow::Result<ResponseEvent>> = events.into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(wrapped)))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
