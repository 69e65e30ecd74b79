//! pathwise-serve - Career inference HTTP service
//!
//! Loads the trained artifact bundle, opens the record database, and serves
//! the prediction API. Refuses to start without a complete, consistent
//! bundle; there is no degraded mode.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pathwise_common::artifacts::ArtifactBundle;
use pathwise_common::config::{database_path, models_dir, resolve_data_folder};
use pathwise_common::db::{init_database, RecordStore};
use pathwise_serve::pipeline::InferencePipeline;
use pathwise_serve::{build_router, AppState};

/// Command-line arguments for pathwise-serve
#[derive(Parser, Debug)]
#[command(name = "pathwise-serve")]
#[command(about = "Career path prediction service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5840", env = "PATHWISE_PORT")]
    port: u16,

    /// Data folder holding the database and trained model artifacts
    /// (defaults to PATHWISE_DATA_FOLDER, then the config file, then the
    /// OS data directory)
    #[arg(short, long)]
    data_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting pathwise-serve v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let data_folder = resolve_data_folder(args.data_folder.as_deref());
    info!("Data folder: {}", data_folder.display());

    // A missing or inconsistent bundle is fatal; there is no degraded mode.
    let models = models_dir(&data_folder);
    let bundle = ArtifactBundle::load(&models)
        .context("Failed to load trained model artifacts")?;

    let db_path = database_path(&data_folder);
    let pool = init_database(&db_path)
        .await
        .context("Failed to open record database")?;
    let store = RecordStore::new(pool);

    let pipeline = InferencePipeline::new(Arc::new(bundle), store.clone());
    let state = AppState::new(Arc::new(pipeline), store);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
