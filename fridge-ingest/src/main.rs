//! fridge-ingest - Ingredient Ingest service
//!
//! Accepts admin CSV uploads of ingredient reference data, embeds each row
//! through an OpenAI-compatible API and stores it in SQLite, streaming
//! progress back to the uploader over SSE.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fridge_common::config::{load_bootstrap_config, RootFolderInitializer, RootFolderResolver};
use fridge_ingest::services::OpenAiEmbeddingClient;
use fridge_ingest::AppState;

const DEFAULT_PORT: u16 = 5780;

/// Command-line arguments for fridge-ingest
#[derive(Parser, Debug)]
#[command(name = "fridge-ingest")]
#[command(about = "Ingredient ingest service for Fridgenator")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides TOML `port`)
    #[arg(short, long, env = "FRIDGE_INGEST_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "FRIDGE_INGEST_HOST")]
    host: std::net::IpAddr,

    /// Root folder holding fridgenator.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter
    let toml_config = load_bootstrap_config(args.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fridge-ingest (Ingredient Ingest) v{}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder and open database
    let root_folder = RootFolderResolver::new("fridge-ingest")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&toml_config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());

    let db_pool = fridge_ingest::db::init_database_pool(&db_path)
        .await
        .context("Failed to open ingredient database")?;
    info!("Database connection established");

    // Embedding provider
    let api_key = fridge_ingest::config::resolve_embedding_api_key(&toml_config.embedding)?;
    let embedder = OpenAiEmbeddingClient::from_config(&toml_config.embedding, api_key)
        .context("Failed to build embedding client")?;
    info!(
        model = %toml_config.embedding.model,
        endpoint = %embedder.endpoint(),
        "Embedding client initialized"
    );

    let state = AppState::new(db_pool, Arc::new(embedder), toml_config.ingest.clone());
    let app = fridge_ingest::build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::new(args.host, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
