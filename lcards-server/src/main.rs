//! lcards-server - Leitner-box flashcard review backend
//!
//! Serves the review API over HTTP and runs the periodic sync sweep and
//! catalog ingestion in the background.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lcards_common::config::TomlConfig;
use lcards_common::db::{init_database, SqliteStore};
use lcards_server::config::{Config, Overrides};
use lcards_server::ingest::ingest_catalog;
use lcards_server::jobs::{spawn_catalog_ingest, spawn_sync_sweep};
use lcards_server::service::ReviewService;
use lcards_server::{build_router, AppState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for lcards-server
#[derive(Parser, Debug)]
#[command(name = "lcards-server")]
#[command(about = "Leitner-box flashcard review server", long_about = None)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "LCARDS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "LCARDS_HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(short, long, env = "LCARDS_PORT")]
    port: Option<u16>,

    /// Path to the SQLite database
    #[arg(short, long, env = "LCARDS_DATABASE")]
    database: Option<PathBuf>,

    /// Directory of CSV word lists to ingest
    #[arg(long, env = "LCARDS_CATALOG_DIR")]
    catalog_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = Config::resolve(
        toml,
        Overrides {
            host: args.host,
            port: args.port,
            database: args.database,
            catalog_dir: args.catalog_dir,
            log_level: args.log_level,
        },
    )
    .context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lcards_server={0},lcards_common={0},tower_http=info", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lcards-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    // Populate the catalog before the first request arrives
    if let Err(e) = ingest_catalog(&pool, &config.catalog).await {
        warn!("Initial catalog ingestion failed: {}", e);
    }

    let store = Arc::new(SqliteStore::new(pool.clone()));
    let service = Arc::new(ReviewService::new(
        store.clone(),
        store,
        config.day_offset,
    ));

    let shutdown = CancellationToken::new();
    let sweep = spawn_sync_sweep(service.clone(), config.sync_interval, shutdown.clone());
    let ingest = spawn_catalog_ingest(
        pool.clone(),
        config.catalog.clone(),
        config.ingest_interval,
        shutdown.clone(),
    );

    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("lcards-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .context("Server error")?;

    // Background jobs observe the same token
    shutdown.cancel();
    let (sweep_result, ingest_result) = tokio::join!(sweep, ingest);
    if let Err(e) = sweep_result {
        error!("Sync sweep task ended abnormally: {}", e);
    }
    if let Err(e) = ingest_result {
        error!("Catalog ingestion task ended abnormally: {}", e);
    }
    pool.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel `shutdown`
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    shutdown.cancel();
}
