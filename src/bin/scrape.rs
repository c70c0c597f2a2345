//! Scraper entry point: walks the gallery and writes the artifact tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use bitscrape::{ScrapeConfig, ScrapeEngine};

#[derive(Parser)]
#[command(
    name = "bitscrape",
    about = "Scrape the reactbits.dev component gallery into a local artifact tree",
    version
)]
struct Cli {
    /// Root directory for scraped artifacts.
    #[arg(long, default_value = "scraped-components")]
    output_dir: PathBuf,

    /// Maximum items to scrape per category.
    #[arg(long, short = 'l')]
    limit: Option<usize>,

    /// Re-scrape items whose artifacts already exist.
    #[arg(long, short = 'f')]
    force: bool,

    /// Run the browser with a visible window.
    #[arg(long)]
    no_headless: bool,

    /// Override the gallery base URL.
    #[arg(long)]
    base_url: Option<String>,

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

    let mut builder = ScrapeConfig::builder(&cli.output_dir)
        .limit(cli.limit)
        .force(cli.force)
        .headless(!cli.no_headless);
    if let Some(base_url) = cli.base_url {
        builder = builder.base_url(base_url);
    }
    let config = builder.build()?;

    info!("Writing artifacts to {}", cli.output_dir.display());

    let engine = ScrapeEngine::new(config);
    match engine.run().await {
        Ok(stats) => {
            println!("Scrape finished: {stats}");
            Ok(())
        }
        Err(e) => {
            error!("Scrape aborted: {e:#}");
            std::process::exit(1);
        }
    }
}
