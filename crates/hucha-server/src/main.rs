//! Hucha server binary

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use hucha_core::config::Config;
use hucha_core::storage::{Database, DatabaseConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "hucha-server")]
#[command(author, version, about = "Expense and inventory HTTP API", long_about = None)]
struct Cli {
    /// Listen address (overrides configuration)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// SQLite database file (overrides configuration)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hucha=info".parse()?)
                .add_directive("hucha_server=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let db = Database::new(
        DatabaseConfig::with_path(&config.database.path)
            .max_connections(config.database.max_connections),
    )
    .await?;
    info!(path = %db.path().display(), "Database ready");

    let app = hucha_server::app(&db);

    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
