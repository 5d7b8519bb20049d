// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use partner_config::{CredentialSource, EnvCredentials};
use partner_tools::ToolRegistry;

use crate::{
    agent::{Agent, AgentConfig},
    capability::select_capabilities,
    dispatcher::AgentFactory,
    error::ConfigurationError,
    prompts::PromptBundle,
};

/// Builds the shopping partner from credentials read at construction time.
pub struct ShoppingAgentFactory<C: CredentialSource = EnvCredentials> {
    credentials: C,
    prompts: PromptBundle,
    config: AgentConfig,
}

impl ShoppingAgentFactory<EnvCredentials> {
    /// Factory reading the process environment.
    pub fn from_env() -> Self {
        Self::new(EnvCredentials)
    }
}

impl<C: CredentialSource> ShoppingAgentFactory<C> {
    pub fn new(credentials: C) -> Self {
        Self { credentials, prompts: PromptBundle::default(), config: AgentConfig::default() }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptBundle) -> Self {
        self.prompts = prompts;
        self
    }

    /// Construct the agent.  Fails only when no model credential is present.
    pub fn build_agent(&self) -> Result<Agent, ConfigurationError> {
        let creds = self.credentials.credentials();
        debug!(?creds, "building shopping partner");

        let caps = select_capabilities(&creds)?;
        let mut registry = ToolRegistry::new();
        for tool in caps.tools() {
            registry.register_arc(tool);
        }

        Ok(Agent::new(caps.model, Arc::new(registry), self.prompts.clone(), self.config.clone()))
    }
}

#[async_trait]
impl<C: CredentialSource + 'static> AgentFactory for ShoppingAgentFactory<C> {
    type Handle = Agent;

    async fn build(&self) -> Result<Agent, ConfigurationError> {
        self.build_agent()
    }
}
