//! Tool server entry point.
//!
//! Serves the component store over newline-delimited JSON-RPC, on stdio by
//! default or TCP with `--tcp`. Logs go to stderr so stdout stays a clean
//! protocol channel.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use bitscrape::query::QueryService;
use bitscrape::server::ToolServer;
use bitscrape::store::ComponentStore;

#[derive(Parser)]
#[command(
    name = "bitscrape-mcp",
    about = "Serve the scraped component store as MCP-style tools",
    version
)]
struct Cli {
    /// Path to the component database.
    #[arg(long, default_value = "reactbits.db")]
    db: PathBuf,

    /// Root of the artifact tree, for code-file fallback reads.
    #[arg(long, default_value = "scraped-components")]
    artifacts: PathBuf,

    /// Serve over TCP at this address instead of stdio.
    #[arg(long, value_name = "ADDR")]
    tcp: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting component tool server");

    let store = ComponentStore::open_read_only(&cli.db).await?;
    info!(
        "Opened {} with {} components",
        cli.db.display(),
        store.count().await?
    );

    let query = QueryService::new(store, Some(cli.artifacts));
    let server = ToolServer::new(query);

    match cli.tcp {
        Some(addr) => server.serve_tcp(&addr).await,
        None => server.serve_stdio().await,
    }
}
