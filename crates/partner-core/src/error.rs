// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// The agent cannot be constructed from the current credentials.
///
/// Never cached: the dispatcher stays uninitialised and the next dispatch
/// retries construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(
        "No API key provided. Set OPENAI_API_KEY or OPENROUTER_API_KEY environment variable.\n\
         For OpenRouter: https://openrouter.ai/keys\n\
         For OpenAI: https://platform.openai.com/api-keys"
    )]
    NoModelCredential,
}

/// Error returned by [`crate::LazyAgent::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("agent configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The agent failed while answering.  Display and source chain are the
    /// agent's own.
    #[error(transparent)]
    Downstream(#[from] anyhow::Error),
}

impl DispatchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, DispatchError::Configuration(_))
    }
}
