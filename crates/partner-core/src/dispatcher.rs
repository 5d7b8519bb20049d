// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Lazy single-instance construction and dispatch.
//!
//! [`LazyAgent`] owns the agent lifecycle: *uninitialised* until the first
//! dispatch builds the agent, then *ready* for the life of the process.
//! Construction runs under a guard so concurrent first calls build exactly
//! one agent; a failed build leaves the state uninitialised and the next
//! call retries.  The guard covers only the check-and-construct step.  Once
//! ready, dispatches share the handle through an `Arc` and never touch the
//! guard.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    error::{ConfigurationError, DispatchError},
    response::RunResponse,
    Conversation,
};

/// A constructed agent that answers conversations.
///
/// `Send + Sync` with `&self` receivers: the handle is shared by every
/// in-flight dispatch.
#[async_trait]
pub trait AgentHandle: Send + Sync + 'static {
    async fn run(&self, conversation: Conversation) -> anyhow::Result<RunResponse>;
}

/// Builds the agent handle.  Called at most once per successful
/// construction; may suspend (network, credential lookups).
#[async_trait]
pub trait AgentFactory: Send + Sync + 'static {
    type Handle: AgentHandle;

    async fn build(&self) -> Result<Self::Handle, ConfigurationError>;
}

/// Process-wide lazily constructed agent, held by the hosting layer.
pub struct LazyAgent<F: AgentFactory> {
    factory: F,
    handle: OnceCell<Arc<F::Handle>>,
}

impl<F: AgentFactory> LazyAgent<F> {
    pub fn new(factory: F) -> Self {
        Self { factory, handle: OnceCell::new() }
    }

    /// `true` once construction has succeeded.  Never triggers construction.
    pub fn is_ready(&self) -> bool {
        self.handle.initialized()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The ready handle, constructing it first if needed.
    pub async fn handle(&self) -> Result<Arc<F::Handle>, ConfigurationError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                info!("initializing shopping partner agent");
                match self.factory.build().await {
                    Ok(h) => {
                        info!("shopping partner agent initialized");
                        Ok(Arc::new(h))
                    }
                    Err(e) => {
                        warn!("agent construction failed: {e}");
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    /// Forward `conversation` to the agent, constructing it on first use.
    ///
    /// The handle's result is returned unchanged.  The construction guard is
    /// released before the agent runs.
    pub async fn dispatch(&self, conversation: Conversation) -> Result<RunResponse, DispatchError> {
        let handle = self.handle().await?;
        handle.run(conversation).await.map_err(DispatchError::Downstream)
    }
}
