// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use partner_config::{
    DEFAULT_OPENROUTER_MODEL, ENV_EXA_API_KEY, ENV_MEM0_API_KEY, ENV_MODEL_NAME,
    ENV_OPENAI_API_KEY, ENV_OPENROUTER_API_KEY,
};

#[derive(Parser, Debug)]
#[command(
    name = "shopping-partner",
    about = "AI shopping partner that finds products matching your requirements",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// OpenAI API key (preferred model backend)
    #[arg(long, env = ENV_OPENAI_API_KEY, hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// OpenRouter API key (used when no OpenAI key is set)
    #[arg(long, env = ENV_OPENROUTER_API_KEY, hide_env_values = true, global = true)]
    pub openrouter_api_key: Option<String>,

    /// Exa API key for web search (DuckDuckGo is used without it)
    #[arg(long, env = ENV_EXA_API_KEY, hide_env_values = true, global = true)]
    pub exa_api_key: Option<String>,

    /// Mem0 API key for long-term memory
    #[arg(long, env = ENV_MEM0_API_KEY, hide_env_values = true, global = true)]
    pub mem0_api_key: Option<String>,

    /// Model id used with OpenRouter, e.g. "anthropic/claude-3.5-sonnet"
    #[arg(long, env = ENV_MODEL_NAME, default_value = DEFAULT_OPENROUTER_MODEL, global = true)]
    pub model: String,

    /// Path to agent_config.json (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the agent over HTTP (the default)
    Serve,
    /// Print the effective configuration as JSON and exit
    ShowConfig,
    /// List supported model providers
    ListProviders {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }

    /// Environment variables to set so the lazily constructed agent sees the
    /// values given on the command line.  Blank values are skipped.
    pub fn env_overrides(&self) -> Vec<(&'static str, String)> {
        let keys = [
            (ENV_OPENAI_API_KEY, &self.openai_api_key),
            (ENV_OPENROUTER_API_KEY, &self.openrouter_api_key),
            (ENV_EXA_API_KEY, &self.exa_api_key),
            (ENV_MEM0_API_KEY, &self.mem0_api_key),
        ];
        let mut out: Vec<(&'static str, String)> = keys
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().filter(|v| !v.trim().is_empty()).map(|v| (k, v.clone())))
            .collect();
        if !self.model.trim().is_empty() {
            out.push((ENV_MODEL_NAME, self.model.clone()));
        }
        out
    }

    /// Write [`Self::env_overrides`] into the process environment.  Must run
    /// before any other thread is started.
    pub fn export_env(&self) {
        for (key, value) in self.env_overrides() {
            std::env::set_var(key, value);
        }
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "shopping-partner", &mut std::io::stdout());
}
