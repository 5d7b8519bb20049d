// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Driver registry: static metadata for the supported model backends.
//!
//! Construction lives in the capability selector; this is only what
//! `list-providers` prints and what the selector consults for defaults.

use crate::{openai::OPENAI_BASE_URL, openrouter::OPENROUTER_BASE_URL};

/// Metadata describing a registered model driver.
#[derive(Debug, Clone)]
pub struct DriverMeta {
    /// Unique provider id (e.g. `"openai"`).
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Environment variable holding the API key.
    pub api_key_env: &'static str,
    pub default_base_url: &'static str,
    /// Where to obtain a key.
    pub key_url: &'static str,
    /// Model used when none is configured.
    pub default_model: &'static str,
}

/// Supported drivers, in selection priority order.
pub static DRIVERS: &[DriverMeta] = &[
    DriverMeta {
        id: "openai",
        name: "OpenAI",
        description: "OpenAI chat completions (always gpt-4o)",
        api_key_env: "OPENAI_API_KEY",
        default_base_url: OPENAI_BASE_URL,
        key_url: "https://platform.openai.com/api-keys",
        default_model: "gpt-4o",
    },
    DriverMeta {
        id: "openrouter",
        name: "OpenRouter",
        description: "OpenRouter gateway, model chosen by MODEL_NAME",
        api_key_env: "OPENROUTER_API_KEY",
        default_base_url: OPENROUTER_BASE_URL,
        key_url: "https://openrouter.ai/keys",
        default_model: "openai/gpt-4o",
    },
];

/// Look up a driver by id.
pub fn get_driver(id: &str) -> Option<&'static DriverMeta> {
    DRIVERS.iter().find(|d| d.id == id)
}

pub fn list_drivers() -> &'static [DriverMeta] {
    DRIVERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_comes_first() {
        assert_eq!(list_drivers()[0].id, "openai");
        assert_eq!(list_drivers()[1].id, "openrouter");
    }

    #[test]
    fn lookup_by_id() {
        let d = get_driver("openrouter").unwrap();
        assert_eq!(d.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(d.default_base_url, "https://openrouter.ai/api/v1");
        assert!(get_driver("anthropic").is_none());
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = DRIVERS.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DRIVERS.len());
    }
}
