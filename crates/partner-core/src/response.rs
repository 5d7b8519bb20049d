// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partner_model::Usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
}

/// One tool invocation made by the model during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub is_error: bool,
}

/// What the agent returns for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: String,
    pub status: RunStatus,
    /// Final assistant text.
    pub content: String,
    pub model: String,
    /// In the order the model requested them.
    pub tool_calls: Vec<ToolCallRecord>,
    pub usage: Usage,
    pub created_at: DateTime<Utc>,
}

impl RunResponse {
    /// A completed response with a fresh run id and no tool traffic.
    pub fn completed(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            status: RunStatus::Completed,
            content: content.into(),
            model: model.into(),
            tool_calls: Vec::new(),
            usage: Usage::default(),
            created_at: Utc::now(),
        }
    }
}
