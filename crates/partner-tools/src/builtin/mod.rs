// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod duckduckgo_search;
pub mod exa_search;
pub mod mem0;

use std::time::Duration;

use serde_json::Value;

const USER_AGENT: &str = concat!("shopping-partner/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the search and memory tools.
pub(crate) fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(USER_AGENT)
        .build()?)
}

/// Read a `1..=10` result count, falling back to `default`.
pub(crate) fn result_count(args: &Value, key: &str, default: u64) -> usize {
    args.get(key).and_then(|v| v.as_u64()).unwrap_or(default).clamp(1, 10) as usize
}

/// Read a required, non-blank string argument.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str()).filter(|s| !s.trim().is_empty())
}

/// Cut `text` to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn result_count_is_clamped() {
        assert_eq!(result_count(&json!({}), "n", 5), 5);
        assert_eq!(result_count(&json!({"n": 0}), "n", 5), 1);
        assert_eq!(result_count(&json!({"n": 50}), "n", 5), 10);
        assert_eq!(result_count(&json!({"n": "three"}), "n", 5), 5);
    }

    #[test]
    fn required_str_rejects_blank() {
        assert_eq!(required_str(&json!({"q": "shoes"}), "q"), Some("shoes"));
        assert!(required_str(&json!({"q": "  "}), "q").is_none());
        assert!(required_str(&json!({"q": 3}), "q").is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ääääää", 3), "äää…");
    }
}
