//! Store loader entry point: rebuilds the SQLite database from the artifact
//! tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use bitscrape::store::{ComponentStore, loader};

#[derive(Parser)]
#[command(
    name = "bitscrape-load",
    about = "Rebuild the component database from a scraped artifact tree",
    version
)]
struct Cli {
    /// Root of the artifact tree to load.
    #[arg(default_value = "scraped-components")]
    artifacts: PathBuf,

    /// Path of the database to (re)build.
    #[arg(long, default_value = "reactbits.db")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Loading {} into {}",
        cli.artifacts.display(),
        cli.db.display()
    );

    let store = ComponentStore::open(&cli.db).await?;
    let loaded = loader::load_artifacts(&store, &cli.artifacts).await?;
    store.close().await;

    println!("Loaded {loaded} components into {}", cli.db.display());
    Ok(())
}
