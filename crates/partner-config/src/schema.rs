// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Serde default for boolean flags that are on unless disabled.
fn default_true() -> bool {
    true
}

fn default_name() -> String {
    "shopping-partner-agent".into()
}

fn default_description() -> String {
    "AI-powered product recommendation system that helps users find the perfect products \
     based on their specific preferences and requirements"
        .into()
}

fn default_version() -> String {
    "1.0.0".into()
}

fn default_url() -> String {
    "http://127.0.0.1:3773".into()
}

/// Agent configuration record (`agent_config.json`).
///
/// Every field has a default so partial files are accepted; unknown keys are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Environment variables the agent understands.  Informational only;
    /// surfaced in the agent card and `show-config`.
    #[serde(default = "default_environment_variables")]
    pub environment_variables: Vec<EnvVarSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            version: default_version(),
            author: None,
            deployment: DeploymentConfig::default(),
            environment_variables: default_environment_variables(),
        }
    }
}

/// How the agent is exposed by the hosting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Public URL of the agent; the listener binds to its host and port.
    #[serde(default = "default_url")]
    pub url: String,
    /// When `false` the listener is forced onto loopback regardless of `url`.
    #[serde(default = "default_true")]
    pub expose: bool,
    #[serde(default = "default_version")]
    pub protocol_version: String,
    /// Hosts allowed to proxy requests to the agent.  Kept in the record for
    /// deployment tooling and `show-config`; the HTTP host does not act on it.
    #[serde(default = "default_proxy_urls")]
    pub proxy_urls: Vec<String>,
    /// Allowed cross-origin callers.  `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_proxy_urls() -> Vec<String> {
    vec!["127.0.0.1".into()]
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            expose: true,
            protocol_version: default_version(),
            proxy_urls: default_proxy_urls(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl DeploymentConfig {
    /// `host:port` the HTTP listener should bind to.
    ///
    /// The port falls back to the scheme default (80/443) when the URL has
    /// none.  A non-exposed deployment always binds `127.0.0.1`.
    pub fn bind_address(&self) -> anyhow::Result<String> {
        let parsed = url::Url::parse(&self.url)
            .with_context(|| format!("invalid deployment url {:?}", self.url))?;
        let Some(host) = parsed.host_str() else {
            bail!("deployment url {:?} has no host", self.url);
        };
        let port = parsed
            .port_or_known_default()
            .with_context(|| format!("deployment url {:?} has no port", self.url))?;
        let host = if self.expose { host } else { "127.0.0.1" };
        Ok(format!("{host}:{port}"))
    }

    /// `true` when any origin may call the agent.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Documentation entry for one environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVarSpec {
    pub key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl EnvVarSpec {
    fn optional(key: &str, description: &str) -> Self {
        Self { key: key.into(), description: description.into(), required: false }
    }
}

fn default_environment_variables() -> Vec<EnvVarSpec> {
    vec![
        EnvVarSpec::optional("OPENAI_API_KEY", "OpenAI API key for LLM calls"),
        EnvVarSpec::optional("OPENROUTER_API_KEY", "OpenRouter API key for LLM calls"),
        EnvVarSpec::optional("EXA_API_KEY", "Exa API key for search operations"),
        EnvVarSpec::optional("MEM0_API_KEY", "Mem0 API key for memory operations"),
    ]
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_matches_builtin_values() {
        let cfg = Config::default();
        assert_eq!(cfg.name, "shopping-partner-agent");
        assert_eq!(cfg.version, "1.0.0");
        assert_eq!(cfg.deployment.url, "http://127.0.0.1:3773");
        assert!(cfg.deployment.expose);
        assert_eq!(cfg.deployment.cors_origins, vec!["*"]);
        assert_eq!(cfg.environment_variables.len(), 4);
        assert!(cfg.environment_variables.iter().all(|e| !e.required));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"name": "custom"}"#).unwrap();
        assert_eq!(cfg.name, "custom");
        assert_eq!(cfg.deployment, DeploymentConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg: Config =
            serde_json::from_str(r#"{"name": "x", "skills": [], "deployment": {"extra": 1}}"#)
                .unwrap();
        assert_eq!(cfg.name, "x");
    }

    #[test]
    fn bind_address_uses_url_host_and_port() {
        let d = DeploymentConfig { url: "http://0.0.0.0:8080".into(), ..Default::default() };
        assert_eq!(d.bind_address().unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn bind_address_forces_loopback_when_not_exposed() {
        let d = DeploymentConfig {
            url: "http://0.0.0.0:8080".into(),
            expose: false,
            ..Default::default()
        };
        assert_eq!(d.bind_address().unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn bind_address_defaults_port_from_scheme() {
        let d = DeploymentConfig { url: "https://agent.example.com".into(), ..Default::default() };
        assert_eq!(d.bind_address().unwrap(), "agent.example.com:443");
    }

    #[test]
    fn bind_address_rejects_garbage() {
        let d = DeploymentConfig { url: "not a url".into(), ..Default::default() };
        assert!(d.bind_address().is_err());
    }

    #[test]
    fn proxy_urls_are_kept_through_a_round_trip() {
        let cfg: Config = serde_json::from_str(
            r#"{"deployment": {"proxy_urls": ["10.0.0.1", "edge.example.com"]}}"#,
        )
        .unwrap();
        let back: Config = serde_json::from_value(serde_json::to_value(&cfg).unwrap()).unwrap();
        assert_eq!(back.deployment.proxy_urls, ["10.0.0.1", "edge.example.com"]);
    }

    #[test]
    fn wildcard_origin_detected() {
        let mut d = DeploymentConfig::default();
        assert!(d.allows_any_origin());
        d.cors_origins = vec!["https://shop.example.com".into()];
        assert!(!d.allows_any_origin());
    }
}
