//! Teamleader MCP Server
//!
//! Entry point for the MCP server binary.
//! Implements MCP protocol over stdio using JSON-RPC 2.0.

use anyhow::Context;
use std::io;
use std::sync::Arc;
use teamleader_mcp::config::Config;
use teamleader_mcp::mcp::{self, TeamleaderMcpServer};
use teamleader_mcp::TeamleaderClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting Teamleader MCP Server...");

    let config = Config::load_default().context("Failed to load configuration")?;
    let runtime_config = config.to_runtime()?;

    tracing::info!(
        api = %runtime_config.api_base_url,
        token_url = %runtime_config.token_url,
        "Configured"
    );

    let initial_refresh_token = runtime_config.refresh_token.clone();

    let client = Arc::new(
        TeamleaderClient::from_config(&runtime_config)
            .context("Failed to build Teamleader client")?,
    );
    let auth = client.auth().clone();

    let server = TeamleaderMcpServer::new(client);

    tracing::info!("MCP Server ready, listening on stdio...");

    tokio::select! {
        res = mcp::run_stdio(server) => res.context("stdio transport failed")?,
        _ = shutdown_signal() => tracing::info!("Shutdown signal received"),
    }

    if auth.get_refresh_token().await != initial_refresh_token {
        tracing::warn!(
            "Teamleader rotated the refresh token during this session; \
             the configured TEAMLEADER_REFRESH_TOKEN is no longer valid"
        );
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
