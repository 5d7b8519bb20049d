// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod types;
mod provider;
mod openai_compat;
mod openai;
mod openrouter;
mod mock;
pub mod registry;

pub use types::*;
pub use provider::{ModelProvider, ResponseStream};
pub use openai_compat::{AuthStyle, OpenAICompatProvider};
pub use openai::{OpenAiProvider, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL};
pub use openrouter::{OpenRouterProvider, OPENROUTER_BASE_URL};
pub use mock::{MockProvider, ScriptedMockProvider};
pub use registry::{get_driver, list_drivers, DriverMeta};
