//! issue-relay entry point.
//!
//! The composition root. In order:
//!
//! 1. Load `.env` and parse [`config::Args`] (flags with environment fallbacks).
//! 2. Install tracing ([`observability::init`]).
//! 3. Validate configuration into a [`config::RelayConfig`].
//! 4. Build the [`jira::JiraClient`], resolve the target project, and build the
//!    [`relay::SyncEngine`].
//! 5. Serve the webhook routes until Ctrl-C or SIGTERM.

mod config;
mod observability;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use jira::JiraClient;
use relay::SyncEngine;
use tracing::{error, info};

use crate::config::{Args, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let telemetry = observability::init(args.log_format)?;

    let result = run(args).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "issue relay failed");
    }
    telemetry.shutdown();
    result
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = RelayConfig::from_args(args).context("invalid configuration")?;
    let client = JiraClient::new(&config.jira).context("failed to build Jira client")?;
    let settings = config
        .sync_settings()
        .context("failed to resolve the target project")?;
    info!(
        base_url = client.base_url(),
        project = %settings.project.key(),
        sync_label = %settings.sync_label,
        default_issue_type = %settings.default_issue_type,
        "configuration loaded"
    );

    let engine = Arc::new(SyncEngine::new(Arc::new(client), settings));
    listener::serve(config.bind, engine, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
