// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod registry;
mod tool;
mod builtin;

pub use registry::{ToolRegistry, ToolSchema};
pub use tool::{ToolCall, ToolOutput, Tool};
pub use builtin::{
    duckduckgo_search::DuckDuckGoSearchTool,
    exa_search::ExaSearchTool,
    mem0::{Mem0Tool, DEFAULT_MEM0_USER_ID},
};
