//! arkiv-er (Entity REST) - item metadata and related resources over HTTP

use std::path::PathBuf;

use anyhow::{Context, Result};
use arkiv_common::config::{RootFolderResolver, ServiceConfig};
use arkiv_common::db::init_database;
use arkiv_er::store::SqliteRepository;
use arkiv_er::{build_router, AppState};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "arkiv-er")]
#[command(about = "Item entity REST service for Arkiv")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides arkiv.toml)
    #[arg(short, long)]
    port: Option<u16>,

    /// Root folder holding arkiv.toml and the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Arkiv Entity REST (arkiv-er) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .resolve();
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("creating root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());

    let mut config = ServiceConfig::load(&root_folder)?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let db_path = config.database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let listen_addr = config.listen_addr();
    let state = AppState::new(SqliteRepository::new(pool), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("binding {}", listen_addr))?;
    info!("arkiv-er listening on http://{}", listen_addr);
    info!("Health check: http://{}/health", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
