// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! OpenRouter gateway driver.
//!
//! Same wire format as OpenAI.  Adds the attribution headers OpenRouter uses
//! for its app rankings and forwards the request cache key as
//! `prompt_cache_key` so repeated turns hit the gateway's prompt cache.

use async_trait::async_trait;

use crate::{
    openai_compat::{AuthStyle, OpenAICompatProvider},
    provider::ResponseStream,
    CompletionRequest,
};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const APP_REFERER: &str = "https://github.com/swedishembedded/shopping-partner";
const APP_TITLE: &str = "Shopping Partner";

pub struct OpenRouterProvider {
    inner: OpenAICompatProvider,
}

impl OpenRouterProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, OPENROUTER_BASE_URL)
    }

    pub fn with_base_url(model: impl Into<String>, api_key: impl Into<String>, base_url: &str) -> Self {
        let inner = OpenAICompatProvider::new(
            "openrouter",
            model.into(),
            Some(api_key.into()),
            base_url,
            None,
            None,
            AuthStyle::Bearer,
        )
        .with_header("HTTP-Referer", APP_REFERER)
        .with_header("X-Title", APP_TITLE)
        .with_cache_key_forwarding();
        Self { inner }
    }
}

#[async_trait]
impl crate::ModelProvider for OpenRouterProvider {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelProvider;

    #[test]
    fn identifies_as_openrouter_with_requested_model() {
        let p = OpenRouterProvider::new("anthropic/claude-3.5-sonnet", "or-test");
        assert_eq!(p.name(), "openrouter");
        assert_eq!(p.model_name(), "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn forwards_cache_key() {
        let p = OpenRouterProvider::new("openai/gpt-4o", "or-test");
        let req = CompletionRequest { cache_key: Some("agent-1".into()), ..Default::default() };
        let body = p.inner.request_body(&req);
        assert_eq!(body["prompt_cache_key"], "agent-1");
        assert_eq!(body["max_tokens"], 4096);
    }
}
