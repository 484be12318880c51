//! katsu-server - clinical metadata HTTP API
//!
//! Serves the MoH clinical data model over REST: authorized reads, admin
//! ingest, and public discovery counts, backed by SQLite.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use katsu_common::config::ServerConfig;
use katsu_common::db::init_database;
use katsu_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "katsu-server", about = "Clinical metadata service")]
struct Args {
    /// Path to the TOML config file (overrides KATSU_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides KATSU_DATABASE and the config file)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Bind port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Katsu Metadata Service (katsu-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServerConfig::load(args.config.as_deref(), args.database.as_deref())?;
    info!("Allowed hosts: {:?}", config.allowed_hosts);
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path).await?;

    let host = args.host.clone().unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);

    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("katsu-server listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
