// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use tracing::info;

use partner_config::Config;
use partner_core::{AgentFactory, LazyAgent};

use crate::{
    error::NodeError,
    http::{router, AppState},
};

/// Bind the deployment address and serve until Ctrl+C or SIGTERM.
///
/// The agent is not constructed here; the first `POST /messages` builds it.
pub async fn serve<F: AgentFactory>(config: Config, agent: Arc<LazyAgent<F>>) -> Result<(), NodeError> {
    let addr = config
        .deployment
        .bind_address()
        .map_err(|e| NodeError::InvalidUrl(format!("{e:#}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| NodeError::Bind { addr: addr.clone(), source })?;
    let local = listener.local_addr()?;

    info!(
        name = %config.name,
        url = %config.deployment.url,
        addr = %local,
        "shopping partner listening"
    );

    let app = router(AppState::new(agent, config));
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
