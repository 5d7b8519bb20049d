// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Environment-derived credentials.
//!
//! Values are treated as presence flags by the capability selector; an empty
//! string counts as absent.

use std::fmt;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_EXA_API_KEY: &str = "EXA_API_KEY";
pub const ENV_MEM0_API_KEY: &str = "MEM0_API_KEY";
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";

/// Model id used with OpenRouter when `MODEL_NAME` is unset.
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o";

/// Snapshot of every credential the agent understands.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub exa_api_key: Option<String>,
    pub mem0_api_key: Option<String>,
    /// Model id forwarded to OpenRouter.
    pub model_name: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openrouter_api_key: None,
            exa_api_key: None,
            mem0_api_key: None,
            model_name: DEFAULT_OPENROUTER_MODEL.into(),
        }
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.  Blank values are
    /// dropped so `FOO=` behaves like an unset variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: get(ENV_OPENAI_API_KEY),
            openrouter_api_key: get(ENV_OPENROUTER_API_KEY),
            exa_api_key: get(ENV_EXA_API_KEY),
            mem0_api_key: get(ENV_MEM0_API_KEY),
            model_name: get(ENV_MODEL_NAME).unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.into()),
        }
    }

    /// `true` when at least one model backend can be constructed.
    pub fn has_model_credential(&self) -> bool {
        self.openai_api_key.is_some() || self.openrouter_api_key.is_some()
    }
}

// Keys must never reach logs; print presence only.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("openrouter_api_key", &mask(&self.openrouter_api_key))
            .field("exa_api_key", &mask(&self.exa_api_key))
            .field("mem0_api_key", &mask(&self.mem0_api_key))
            .field("model_name", &self.model_name)
            .finish()
    }
}

/// Where the agent factory reads credentials from at construction time.
///
/// Read on every construction attempt, so a credential injected after a
/// failed attempt is picked up by the retry.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Credentials;
}

/// Reads the process environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Credentials {
        Credentials::from_env()
    }
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Credentials {
        self.clone()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_lookup_has_no_credentials() {
        let c = Credentials::from_lookup(lookup(&[]));
        assert!(!c.has_model_credential());
        assert_eq!(c.model_name, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let c = Credentials::from_lookup(lookup(&[
            (ENV_OPENAI_API_KEY, ""),
            (ENV_OPENROUTER_API_KEY, "   "),
            (ENV_MODEL_NAME, ""),
        ]));
        assert!(c.openai_api_key.is_none());
        assert!(c.openrouter_api_key.is_none());
        assert_eq!(c.model_name, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn all_keys_are_read() {
        let c = Credentials::from_lookup(lookup(&[
            (ENV_OPENAI_API_KEY, "sk-1"),
            (ENV_OPENROUTER_API_KEY, "or-1"),
            (ENV_EXA_API_KEY, "exa-1"),
            (ENV_MEM0_API_KEY, "m0-1"),
            (ENV_MODEL_NAME, "anthropic/claude-3.5-sonnet"),
        ]));
        assert_eq!(c.openai_api_key.as_deref(), Some("sk-1"));
        assert_eq!(c.openrouter_api_key.as_deref(), Some("or-1"));
        assert_eq!(c.exa_api_key.as_deref(), Some("exa-1"));
        assert_eq!(c.mem0_api_key.as_deref(), Some("m0-1"));
        assert_eq!(c.model_name, "anthropic/claude-3.5-sonnet");
        assert!(c.has_model_credential());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let c = Credentials {
            openai_api_key: Some("sk-secret-value".into()),
            ..Default::default()
        };
        let printed = format!("{c:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<set>"));
    }
}
