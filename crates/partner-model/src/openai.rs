// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! OpenAI driver: thin wrapper around the shared [`OpenAICompatProvider`].

use async_trait::async_trait;

use crate::{
    openai_compat::{AuthStyle, OpenAICompatProvider},
    provider::ResponseStream,
    CompletionRequest,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used whenever an OpenAI key is present.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI chat-completions driver.
pub struct OpenAiProvider {
    inner: OpenAICompatProvider,
}

impl OpenAiProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, OPENAI_BASE_URL)
    }

    pub fn with_base_url(model: impl Into<String>, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            inner: OpenAICompatProvider::new(
                "openai",
                model.into(),
                Some(api_key.into()),
                base_url,
                None,
                None,
                AuthStyle::Bearer,
            ),
        }
    }
}

#[async_trait]
impl crate::ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        self.inner.complete(req).await
    }
}
