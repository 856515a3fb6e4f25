//! smslog-serve - HTTP server for the smslog archive.
//!
//! Binds `server.bind_addr` from the config file and serves the ingestion and
//! read endpoints until Ctrl-C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::http::Request;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::Level;

use smslog_core::{logging, Config};
use smslog_serve::{router, AppState};

/// smslog HTTP server
#[derive(Parser, Debug)]
#[command(name = "smslog-serve")]
#[command(about = "Receive and serve archived SMS messages over HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/smslog/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `server.bind_addr`
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding the record log and fingerprint index
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let _guard = logging::init(&config.logging).context("failed to initialize logging")?;

    let state = AppState::from_config(&config)?;
    let bind_addr = config.server.bind_addr.clone();

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<_>| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        },
    ));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, "starting server");
    eprintln!("smslog-serve listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
