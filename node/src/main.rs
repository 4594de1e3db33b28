// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # OmniUtil Node
//!
//! Entry point for the `omniutil-node` binary. Parses CLI arguments,
//! initializes logging, and dispatches to a subcommand:
//!
//! - `serve`    — HTTP API plus the Prometheus metrics endpoint
//! - `presence` — periodic proof-of-presence worker
//! - `keygen`   — generate an Ed25519 signing key
//! - `version`  — print build version information

mod api;
mod cli;
mod logging;
mod metrics;
mod presence;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use omniutil_protocol::accounting::Accounting;
use omniutil_protocol::crypto::keys::SignerKeypair;
use omniutil_protocol::merit::MeritEngine;
use omniutil_protocol::partner::{PartnerRegistry, TierPolicy};

use cli::{Commands, OmniNodeCli};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = OmniNodeCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.log_format);

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Presence(args) => run_presence(args).await,
        Commands::Keygen(args) => keygen(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Serves the API and the metrics endpoint until a shutdown signal.
async fn serve(args: cli::ServeArgs) -> Result<()> {
    tracing::info!(
        bind = %args.bind,
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        base_rate = args.base_rate,
        "starting omniutil-node"
    );

    let engine = MeritEngine::new(args.base_rate).context("invalid --base-rate")?;
    let node_metrics = Arc::new(NodeMetrics::new());

    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            omniutil_protocol::config::PROTOCOL_VERSION,
        ),
        accounting: Arc::new(Accounting::new(engine)),
        partners: Arc::new(PartnerRegistry::new()),
        policy: Arc::new(TierPolicy::default()),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.bind, args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {api_addr}"))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("{}:{}", args.bind, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("omniutil-node stopped");
    Ok(())
}

/// Runs the presence worker: one cycle with `--once`, otherwise a loop.
async fn run_presence(args: cli::PresenceArgs) -> Result<()> {
    let config = presence::PresenceConfig::from_args(&args)?;

    if args.once {
        tokio::task::spawn_blocking(move || presence::run_cycle(&config, chrono::Utc::now()))
            .await
            .context("presence cycle task aborted")??;
        return Ok(());
    }

    let interval = Duration::from_secs(args.interval_minutes.max(1) * 60);
    tracing::info!(
        interval_minutes = args.interval_minutes,
        data_dir = %args.data_dir.display(),
        public_dir = %args.public_dir.display(),
        "starting presence worker"
    );

    tokio::select! {
        _ = presence::run_loop(config, interval) => {}
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, stopping presence worker");
        }
    }
    Ok(())
}

/// Generates a signing key and writes it to `--out` or stdout.
fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let keypair = SignerKeypair::generate();
    let public_key = keypair.public_key_hex();

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, keypair.secret_key_hex())
                .with_context(|| format!("failed to write signing key to {}", path.display()))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
            }

            tracing::info!(public_key = %public_key, key_path = %path.display(), "signing key generated");
            println!("Signing key : {}", path.display());
            println!("Public key  : {}", public_key);
        }
        None => {
            println!("secret_key={}", keypair.secret_key_hex());
            println!("public_key={}", public_key);
        }
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("omniutil-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", omniutil_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
