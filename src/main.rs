// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use partner_config::{Config, Credentials};
use partner_core::{LazyAgent, ShoppingAgentFactory};

fn main() -> ExitCode {
    // `.env` first so clap's env fallbacks see its values.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    // Before the runtime starts any worker thread.
    cli.export_env();

    let result = run(cli);

    info!("cleaning up");
    info!("cleanup complete, resources released");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command_or_default() {
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            Ok(())
        }
        Commands::ShowConfig => {
            let config = partner_config::load(cli.config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::ListProviders { json } => list_providers_cmd(json),
        Commands::Serve => {
            let config = partner_config::load(cli.config.as_deref())?;
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(serve(config))
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("starting Shopping Partner agent");
    info!(
        name = %config.name,
        version = %config.version,
        url = %config.deployment.url,
        "agent configuration"
    );
    // Presence only; the agent itself reads credentials on first use.
    let creds = Credentials::from_env();
    info!(?creds, "credentials");
    if !creds.has_model_credential() {
        warn!(
            "no model API key set; requests will fail until OPENAI_API_KEY or \
             OPENROUTER_API_KEY is provided"
        );
    }

    let agent = Arc::new(LazyAgent::new(ShoppingAgentFactory::from_env()));
    partner_node::serve(config, agent).await.context("serving the shopping partner")?;

    info!("Shopping Partner agent stopped");
    Ok(())
}

/// List the supported model backends in selection order.
fn list_providers_cmd(as_json: bool) -> anyhow::Result<()> {
    let drivers = partner_model::list_drivers();

    if as_json {
        #[derive(serde::Serialize)]
        struct ProviderJson {
            id: &'static str,
            name: &'static str,
            description: &'static str,
            api_key_env: &'static str,
            default_base_url: &'static str,
            key_url: &'static str,
            default_model: &'static str,
        }
        let rows: Vec<ProviderJson> = drivers
            .iter()
            .map(|d| ProviderJson {
                id: d.id,
                name: d.name,
                description: d.description,
                api_key_env: d.api_key_env,
                default_base_url: d.default_base_url,
                key_url: d.key_url,
                default_model: d.default_model,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Supported model providers, in selection order\n");
    for (i, d) in drivers.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, d.name, d.id);
        println!("     {}", d.description);
        println!("     API key env   : {}", d.api_key_env);
        println!("     Get a key     : {}", d.key_url);
        println!("     Default model : {}", d.default_model);
        println!();
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
