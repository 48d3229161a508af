//! DuoDash - Shared Goals Dashboard for Two
//!
//! Main entry point: loads configuration, opens the database, seeds a fresh
//! install and serves the REST API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use duodash::storage::config::{load_config, load_config_from};
use duodash::storage::{seed_if_empty, Database};
use duodash::{create_router, AppState};

#[derive(Parser)]
#[command(name = "duodash")]
#[command(about = "Shared goals dashboard for two", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "DUODASH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config file)
    #[arg(short, long, env = "DUODASH_DATABASE")]
    database: Option<PathBuf>,

    /// Interface to bind (overrides config file)
    #[arg(long, env = "DUODASH_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "DUODASH_PORT")]
    port: Option<u16>,

    /// Skip first-run seeding
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Starting DuoDash v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("failed to load configuration")?;

    // Apply CLI overrides
    if let Some(database) = cli.database {
        config.database.path = Some(database);
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let mut db = Database::open(&config.database_path()).context("failed to open database")?;

    if !cli.no_seed {
        let report = seed_if_empty(db.connection_mut(), &config, Utc::now())?;
        if report.profiles > 0 {
            info!(
                "Seeded {} profiles and {} starter goals",
                report.profiles, report.goals
            );
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;

    let state = Arc::new(AppState::new(db, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
