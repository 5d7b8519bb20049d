// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Capability selection from credential presence.
//!
//! Each capability is an ordered list of `(predicate, constructor)` rules;
//! the first rule whose predicate holds wins.

use std::sync::Arc;

use tracing::{info, warn};

use partner_config::Credentials;
use partner_model::{ModelProvider, OpenAiProvider, OpenRouterProvider, OPENAI_DEFAULT_MODEL};
use partner_tools::{DuckDuckGoSearchTool, ExaSearchTool, Mem0Tool, Tool};

use crate::error::ConfigurationError;

/// One selection rule.
pub struct Rule<T> {
    /// Short id used in logs and `show-config`.
    pub id: &'static str,
    pub applies: fn(&Credentials) -> bool,
    pub build: fn(&Credentials) -> T,
}

/// Evaluate `rules` in order and build the first match.
pub fn select<T>(rules: &[Rule<T>], creds: &Credentials) -> Option<(&'static str, T)> {
    rules.iter().find(|r| (r.applies)(creds)).map(|r| (r.id, (r.build)(creds)))
}

fn key(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn openai_model(c: &Credentials) -> Arc<dyn ModelProvider> {
    Arc::new(OpenAiProvider::new(OPENAI_DEFAULT_MODEL, key(&c.openai_api_key)))
}

fn openrouter_model(c: &Credentials) -> Arc<dyn ModelProvider> {
    Arc::new(OpenRouterProvider::new(c.model_name.clone(), key(&c.openrouter_api_key)))
}

fn exa_search(c: &Credentials) -> Arc<dyn Tool> {
    Arc::new(ExaSearchTool::new(key(&c.exa_api_key)))
}

fn duckduckgo_search(_: &Credentials) -> Arc<dyn Tool> {
    Arc::new(DuckDuckGoSearchTool::default())
}

fn mem0_memory(c: &Credentials) -> Arc<dyn Tool> {
    Arc::new(Mem0Tool::new(key(&c.mem0_api_key)))
}

/// Model backend rules, highest priority first.
pub fn model_rules() -> Vec<Rule<Arc<dyn ModelProvider>>> {
    vec![
        Rule { id: "openai", applies: |c| c.openai_api_key.is_some(), build: openai_model },
        Rule { id: "openrouter", applies: |c| c.openrouter_api_key.is_some(), build: openrouter_model },
    ]
}

/// Search tool rules.  The last rule always applies.
pub fn search_rules() -> Vec<Rule<Arc<dyn Tool>>> {
    vec![
        Rule { id: "exa", applies: |c| c.exa_api_key.is_some(), build: exa_search },
        Rule { id: "duckduckgo", applies: |_| true, build: duckduckgo_search },
    ]
}

/// Optional memory tool rule.
pub fn memory_rules() -> Vec<Rule<Arc<dyn Tool>>> {
    vec![Rule { id: "mem0", applies: |c| c.mem0_api_key.is_some(), build: mem0_memory }]
}

/// Everything the selector picked for one agent instance.
pub struct Capabilities {
    pub model: Arc<dyn ModelProvider>,
    pub search: Arc<dyn Tool>,
    pub memory: Option<Arc<dyn Tool>>,
}

impl Capabilities {
    pub fn tools(&self) -> impl Iterator<Item = Arc<dyn Tool>> + '_ {
        std::iter::once(Arc::clone(&self.search)).chain(self.memory.iter().cloned())
    }
}

/// Select model, search and memory capabilities.  Credential values are
/// never logged.
pub fn select_capabilities(creds: &Credentials) -> Result<Capabilities, ConfigurationError> {
    let (model_rule, model) =
        select(&model_rules(), creds).ok_or(ConfigurationError::NoModelCredential)?;
    match model_rule {
        "openai" => info!(model = %model.model_name(), "using OpenAI"),
        _ => info!(model = %model.model_name(), "using OpenRouter model"),
    }

    let search = match select(&search_rules(), creds) {
        Some(("exa", tool)) => {
            info!(tool = %tool.name(), "added Exa search tool");
            tool
        }
        Some((_, tool)) => {
            info!(tool = %tool.name(), "added DuckDuckGo search tool (EXA_API_KEY not set)");
            tool
        }
        None => duckduckgo_search(creds),
    };

    let memory = match select(&memory_rules(), creds) {
        Some((_, tool)) => {
            info!(tool = %tool.name(), "added Mem0 memory tool");
            Some(tool)
        }
        None => {
            warn!("MEM0_API_KEY not set, memory features disabled");
            None
        }
    };

    Ok(Capabilities { model, search, memory })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(openai: bool, openrouter: bool, exa: bool, mem0: bool) -> Credentials {
        let flag = |on: bool, v: &str| on.then(|| v.to_string());
        Credentials {
            openai_api_key: flag(openai, "sk-test"),
            openrouter_api_key: flag(openrouter, "or-test"),
            exa_api_key: flag(exa, "exa-test"),
            mem0_api_key: flag(mem0, "m0-test"),
            model_name: "anthropic/claude-3.5-sonnet".into(),
        }
    }

    #[test]
    fn openai_wins_over_openrouter() {
        let caps = select_capabilities(&creds(true, true, false, false)).unwrap();
        assert_eq!(caps.model.name(), "openai");
        assert_eq!(caps.model.model_name(), "gpt-4o");
    }

    #[test]
    fn openrouter_uses_model_name() {
        let caps = select_capabilities(&creds(false, true, false, false)).unwrap();
        assert_eq!(caps.model.name(), "openrouter");
        assert_eq!(caps.model.model_name(), "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn no_model_key_is_configuration_error() {
        let err = select_capabilities(&creds(false, false, true, true)).err().unwrap();
        assert_eq!(err, ConfigurationError::NoModelCredential);
    }

    #[test]
    fn exa_preferred_then_duckduckgo() {
        let with_exa = select_capabilities(&creds(true, false, true, false)).unwrap();
        assert_eq!(with_exa.search.name(), "exa_search");
        let without = select_capabilities(&creds(true, false, false, false)).unwrap();
        assert_eq!(without.search.name(), "duckduckgo_search");
    }

    #[test]
    fn memory_is_optional() {
        let caps = select_capabilities(&creds(true, false, false, true)).unwrap();
        let names: Vec<_> = caps.tools().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["duckduckgo_search", "mem0_memory"]);

        let caps = select_capabilities(&creds(true, false, false, false)).unwrap();
        assert!(caps.memory.is_none());
        assert_eq!(caps.tools().count(), 1);
    }

    #[test]
    fn select_returns_first_matching_rule() {
        let rules: Vec<Rule<u8>> = vec![
            Rule { id: "never", applies: |_| false, build: |_| 0 },
            Rule { id: "first", applies: |_| true, build: |_| 1 },
            Rule { id: "second", applies: |_| true, build: |_| 2 },
        ];
        assert_eq!(select(&rules, &Credentials::default()), Some(("first", 1)));
        assert_eq!(select(&rules[..1], &Credentials::default()), None);
    }
}
