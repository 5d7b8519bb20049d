// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

// ─── Message types ────────────────────────────────────────────────────────────

/// A single message in a conversation.
///
/// The plain `{"role": "...", "content": "..."}` shape used by callers
/// deserializes into `MessageContent::Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: MessageContent::Text(text.into()) }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: MessageContent::Text(text.into()) }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Text(text.into()) }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::ToolCall {
                tool_call_id: id.into(),
                function: FunctionCall { name: name.into(), arguments: arguments.into() },
            },
        }
    }

    pub fn tool_result(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::ToolResult {
                tool_call_id: id.into(),
                content: content.into(),
            },
        }
    }

    /// Return the plain text of this message, if it is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// The content of a message.
///
/// - `Text` – simple string (every caller-supplied message)
/// - `ToolCall` – the assistant requests a tool invocation
/// - `ToolResult` – the result of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    ToolCall {
        tool_call_id: String,
        function: FunctionCall,
    },
    ToolResult {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

/// A tool schema provided to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters object
    pub parameters: serde_json::Value,
}

/// Request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub stream: bool,
    /// Stable identifier forwarded to providers that support an explicit
    /// cache key (OpenRouter's `prompt_cache_key`).
    pub cache_key: Option<String>,
}

/// A single streamed event from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    /// A text delta streamed from the model
    TextDelta(String),
    /// The model wants to call a tool.  Deltas for the same call share an
    /// `index`; `id` and `name` are only present on the first one.
    ToolCall {
        index: u32,
        id: String,
        name: String,
        arguments: String,
    },
    /// Final usage statistics
    Usage {
        input_tokens: u32,
        output_tokens: u32,
    },
    /// The model hit its output-token limit
    MaxTokens,
    /// The stream finished normally
    Done,
    /// In-band failure reported by the provider; the consumer must fail the turn.
    Error(String),
}

/// Token usage accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn add(&mut self, input_tokens: u32, output_tokens: u32) {
        self.input_tokens = self.input_tokens.saturating_add(input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(output_tokens);
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_user_sets_role_and_text() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.as_text(), Some("hello"));
    }

    #[test]
    fn message_tool_result_has_no_text() {
        let m = Message::tool_result("id-1", "output");
        assert_eq!(m.role, Role::Tool);
        assert!(m.as_text().is_none());
    }

    #[test]
    fn plain_role_content_json_is_a_text_message() {
        let m: Message = serde_json::from_str(r#"{"role":"system","content":"be brief"}"#).unwrap();
        assert_eq!(m, Message::system("be brief"));
    }

    #[test]
    fn text_message_serializes_to_role_content_pair() {
        let v = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(v, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let r = serde_json::from_str::<Message>(r#"{"role":"robot","content":"x"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn usage_add_saturates() {
        let mut u = Usage { input_tokens: u32::MAX - 1, output_tokens: 0 };
        u.add(5, 3);
        assert_eq!(u.input_tokens, u32::MAX);
        assert_eq!(u.output_tokens, 3);
    }
}
