// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Local, Utc};
use futures::StreamExt;
use tracing::{debug, info, warn};

use partner_model::{CompletionRequest, Message, ModelProvider, ResponseEvent, ToolSchema, Usage};
use partner_tools::{ToolCall, ToolOutput, ToolRegistry};

use crate::{
    dispatcher::AgentHandle,
    prompts::PromptBundle,
    response::{RunResponse, RunStatus, ToolCallRecord},
};

/// Tunables for the model ↔ tool loop.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Tool-calling rounds before the model is told to conclude.
    pub max_tool_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_tool_rounds: 8 }
    }
}

/// The shopping partner.  Read-only after construction; every run works on
/// its own copy of the conversation, so `run` may be called concurrently.
pub struct Agent {
    /// Stable per-instance id, forwarded as the provider cache key.
    instance_id: String,
    model: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    prompts: PromptBundle,
    config: AgentConfig,
}

/// Result of one model call.
struct Turn {
    text: String,
    tool_calls: Vec<ToolCall>,
    usage: Usage,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        prompts: PromptBundle,
        config: AgentConfig,
    ) -> Self {
        Self {
            instance_id: uuid::Uuid::new_v4().to_string(),
            model,
            tools,
            prompts,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.prompts.name
    }

    pub fn provider_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    /// Answer one conversation.
    ///
    /// The caller's messages are sent verbatim and in order after the
    /// agent's own system message.  A model failure is returned as an
    /// error; a tool failure is handed back to the model as an error result.
    pub async fn run(&self, conversation: Vec<Message>) -> anyhow::Result<RunResponse> {
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            model = %self.model.model_name(),
            message_count = conversation.len(),
            "starting agent run"
        );

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(self.prompts.system_message(Local::now())));
        messages.extend(conversation);

        let mut usage = Usage::default();
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut rounds = 0u32;

        let content = loop {
            rounds += 1;
            if rounds > self.config.max_tool_rounds {
                // Give the model one tool-free turn to answer with what it has.
                warn!(run_id = %run_id, max = self.config.max_tool_rounds, "tool round budget exhausted");
                messages.push(Message::user(format!(
                    "You have reached the maximum tool-call budget ({} rounds). \
                     Do not call any more tools. Answer with the information gathered so far.",
                    self.config.max_tool_rounds
                )));
                let turn = self.stream_one_turn(&messages, false).await?;
                usage.add(turn.usage.input_tokens, turn.usage.output_tokens);
                break turn.text;
            }

            let turn = self.stream_one_turn(&messages, true).await?;
            usage.add(turn.usage.input_tokens, turn.usage.output_tokens);

            if turn.tool_calls.is_empty() {
                break turn.text;
            }
            if !turn.text.is_empty() {
                messages.push(Message::assistant(&turn.text));
            }

            // Phase 1: every tool-call message precedes any tool result
            // (OpenAI's parallel-tool-call wire format).
            for tc in &turn.tool_calls {
                debug!(run_id = %run_id, tool = %tc.name, call_id = %tc.id, "tool call requested");
                messages.push(Message::tool_call(&tc.id, &tc.name, tc.args.to_string()));
            }

            // Phase 2: execute concurrently, collect in request order.
            let outputs = self.execute_tools(&turn.tool_calls).await;

            // Phase 3: results.
            for (tc, output) in turn.tool_calls.iter().zip(outputs) {
                if output.is_error {
                    warn!(run_id = %run_id, tool = %tc.name, "tool returned an error: {}", output.content);
                }
                records.push(ToolCallRecord {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    is_error: output.is_error,
                });
                messages.push(Message::tool_result(&tc.id, output.content));
            }
        };

        info!(
            run_id = %run_id,
            rounds,
            tool_calls = records.len(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "agent run completed"
        );

        Ok(RunResponse {
            run_id,
            status: RunStatus::Completed,
            content,
            model: self.model.model_name().to_string(),
            tool_calls: records,
            usage,
            created_at: Utc::now(),
        })
    }

    async fn execute_tools(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        // Tasks are isolated; a panicking tool becomes an error result.
        let tasks: Vec<_> = calls
            .iter()
            .cloned()
            .map(|tc| {
                let registry = Arc::clone(&self.tools);
                tokio::spawn(async move { registry.execute(&tc).await })
            })
            .collect();

        let mut outputs = Vec::with_capacity(calls.len());
        for (tc, task) in calls.iter().zip(tasks) {
            let output = match task.await {
                Ok(output) => output,
                Err(e) => ToolOutput::err(&tc.id, format!("tool execution panicked: {e}")),
            };
            outputs.push(output);
        }
        outputs
    }

    /// Call the model once and collect text, tool calls and usage.
    async fn stream_one_turn(&self, messages: &[Message], with_tools: bool) -> anyhow::Result<Turn> {
        let tools: Vec<ToolSchema> = if with_tools {
            self.tools
                .schemas()
                .into_iter()
                .map(|s| ToolSchema { name: s.name, description: s.description, parameters: s.parameters })
                .collect()
        } else {
            Vec::new()
        };

        let req = CompletionRequest {
            messages: messages.to_vec(),
            tools,
            stream: true,
            cache_key: Some(self.instance_id.clone()),
        };

        let mut stream = self.model.complete(req).await.context("model completion failed")?;

        let mut text = String::new();
        let mut usage = Usage::default();
        // Keyed by the provider's parallel-tool-call index.
        let mut pending: HashMap<u32, PendingToolCall> = HashMap::new();

        while let Some(event) = stream.next().await {
            match event.context("model stream failed")? {
                ResponseEvent::TextDelta(delta) => text.push_str(&delta),
                ResponseEvent::ToolCall { index, id, name, arguments } => {
                    let ptc = pending.entry(index).or_default();
                    if !id.is_empty() {
                        ptc.id = id;
                    }
                    if !name.is_empty() {
                        ptc.name = name;
                    }
                    ptc.args_buf.push_str(&arguments);
                }
                ResponseEvent::Usage { input_tokens, output_tokens } => {
                    usage.add(input_tokens, output_tokens);
                }
                ResponseEvent::MaxTokens => {
                    warn!(model = %self.model.model_name(), "model hit its output token limit");
                }
                ResponseEvent::Done => break,
                ResponseEvent::Error(e) => anyhow::bail!("model stream error: {e}"),
            }
        }

        let mut sorted: Vec<(u32, PendingToolCall)> = pending.into_iter().collect();
        sorted.sort_by_key(|(idx, _)| *idx);
        let mut tool_calls = Vec::with_capacity(sorted.len());
        for (i, (_, ptc)) in sorted.into_iter().enumerate() {
            if ptc.name.is_empty() {
                warn!(tool_call_id = %ptc.id, "dropping tool call with empty name from model");
                continue;
            }
            let mut tc = ptc.finish();
            if tc.id.is_empty() {
                tc.id = format!("tc_synthetic_{i}");
            }
            tool_calls.push(tc);
        }

        Ok(Turn { text, tool_calls, usage })
    }
}

#[async_trait]
impl AgentHandle for Agent {
    async fn run(&self, conversation: Vec<Message>) -> anyhow::Result<RunResponse> {
        Agent::run(self, conversation).await
    }
}

#[derive(Default)]
struct PendingToolCall {
    id: String,
    name: String,
    args_buf: String,
}

impl PendingToolCall {
    fn finish(self) -> ToolCall {
        // Tools expect an object; anything else becomes `{}` and the tool
        // reports the missing arguments back to the model.
        let args = if self.args_buf.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            match serde_json::from_str::<serde_json::Value>(&self.args_buf) {
                Ok(v) if v.is_object() => v,
                _ => {
                    warn!(
                        tool_name = %self.name,
                        tool_call_id = %self.id,
                        args_buf = %self.args_buf,
                        "model sent tool call with invalid JSON arguments; substituting {{}}"
                    );
                    serde_json::Value::Object(Default::default())
                }
            }
        };
        ToolCall { id: self.id, name: self.name, args }
    }
}
