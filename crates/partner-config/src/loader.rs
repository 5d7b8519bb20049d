// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::Config;

pub const CONFIG_FILE_NAME: &str = "agent_config.json";

/// Ordered list of config file locations, highest priority first.
/// The first file that exists and parses wins.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Working directory
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }

    // 2. Next to the executable
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }

    // 3. XDG / home
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("shopping-partner").join(CONFIG_FILE_NAME));
    }

    paths
}

/// Load the agent configuration.
///
/// An explicit path (the `--config` flag) must be readable and valid; errors
/// are returned.  Otherwise the search paths are tried in order, skipping
/// files that cannot be read or parsed, and the built-in default is used when
/// none is usable.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(p) = explicit {
        debug!(path = %p.display(), "loading explicit config");
        return read_config(p);
    }

    match first_usable(&config_search_paths()) {
        Some((path, config)) => {
            info!(path = %path.display(), "loaded agent config");
            Ok(config)
        }
        None => {
            warn!("no {CONFIG_FILE_NAME} found, using default configuration");
            Ok(Config::default())
        }
    }
}

fn first_usable(candidates: &[PathBuf]) -> Option<(PathBuf, Config)> {
    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match read_config(path) {
            Ok(config) => return Some((path.clone(), config)),
            Err(e) => warn!(path = %path.display(), "skipping unreadable config: {e:#}"),
        }
    }
    None
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
