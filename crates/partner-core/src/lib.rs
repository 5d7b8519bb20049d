// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod agent;
mod builder;
pub mod capability;
mod dispatcher;
mod error;
mod prompts;
mod response;

pub use agent::{Agent, AgentConfig};
pub use builder::ShoppingAgentFactory;
pub use capability::{select_capabilities, Capabilities};
pub use dispatcher::{AgentFactory, AgentHandle, LazyAgent};
pub use error::{ConfigurationError, DispatchError};
pub use prompts::{PromptBundle, AGENT_NAME};
pub use response::{RunResponse, RunStatus, ToolCallRecord};

/// An ordered sequence of `{role, content}` messages.
pub type Conversation = Vec<partner_model::Message>;
