pub mod browser_setup;
pub mod cleaner;
pub mod config;
pub mod firecrawl;
pub mod page_extractor;
pub mod query;
pub mod scrape_engine;
pub mod server;
pub mod site_mapper;
pub mod store;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ScrapeConfig, ScrapeConfigBuilder};
pub use firecrawl::{ExtractOutcome, FirecrawlClient};
pub use page_extractor::schema::{Category, ComponentPayload, PropInfo};
pub use query::{QueryError, QueryService};
pub use scrape_engine::{RunStats, ScrapeEngine};
pub use server::ToolServer;
pub use site_mapper::SiteMap;
pub use store::{ComponentRow, ComponentStore};
