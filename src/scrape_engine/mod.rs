//! The scrape orchestrator.
//!
//! Walks the site map sequentially, one item at a time, running the
//! extraction ladder for each: structured-extraction service first, then the
//! browser DOM. Successful items get JSON and code artifacts; an item whose
//! every stage failed writes nothing, so the next non-forced run retries it
//! instead of skipping past a stale failure record.

pub mod artifacts;
pub mod stats;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::browser_setup::launch_browser;
use crate::config::ScrapeConfig;
use crate::firecrawl::{ExtractOutcome, FirecrawlClient};
use crate::page_extractor::schema::{Category, ComponentPayload};
use crate::page_extractor::screenshot::capture_preview;
use crate::page_extractor::{extract_from_page, open_item_page};
use crate::site_mapper::{self, SiteMap};
use crate::utils::slug_for_url;

pub use stats::RunStats;

/// Which extraction stage produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Service,
    Browser,
    Failed,
}

/// Sequential scraper for the whole gallery.
pub struct ScrapeEngine {
    config: ScrapeConfig,
    firecrawl: FirecrawlClient,
}

impl ScrapeEngine {
    pub fn new(config: ScrapeConfig) -> Self {
        let firecrawl = FirecrawlClient::new(config.api_key());
        Self { config, firecrawl }
    }

    #[cfg(test)]
    fn with_client(config: ScrapeConfig, firecrawl: FirecrawlClient) -> Self {
        Self { config, firecrawl }
    }

    /// Run the full scrape and return the accumulated counters.
    ///
    /// A browser that fails to launch is fatal; everything after that is
    /// per-item and recorded in the stats instead of aborting the run.
    pub async fn run(&self) -> Result<RunStats> {
        let (mut browser, handler_task, user_data_dir) = launch_browser(self.config.headless())
            .await
            .context("browser launch failed")?;

        let map = self.discover().await;
        if map.is_empty() {
            warn!("Site mapping discovered no items");
        }

        let mut stats = RunStats::default();

        for (category, urls) in map.iter() {
            let limit = self.config.limit().unwrap_or(usize::MAX);
            info!(
                "Scraping {} {} items (limit {:?})",
                urls.len().min(limit),
                category,
                self.config.limit()
            );

            for url in urls.iter().take(limit) {
                let slug = slug_for_url(url);
                if self.should_skip(category, &slug) {
                    debug!("Skipping {slug}: artifact already present");
                    stats.skipped += 1;
                    continue;
                }

                self.scrape_item(&browser, category, url, &slug, &mut stats)
                    .await;
                self.throttle().await;
            }
        }

        if let Err(e) = artifacts::generate_readme(self.config.output_dir()).await {
            warn!("README regeneration failed: {e:#}");
        }

        if let Err(e) = browser.close().await {
            debug!("Browser close reported: {e}");
        }
        handler_task.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&user_data_dir).await {
            debug!(
                "Could not remove user data dir {}: {e}",
                user_data_dir.display()
            );
        }

        info!("Scrape complete: {stats}");
        Ok(stats)
    }

    /// Map the site, preferring the service and degrading to a root fetch
    /// merged with the curated paths.
    async fn discover(&self) -> SiteMap {
        match site_mapper::map_with_service(&self.firecrawl, self.config.base_url()).await {
            Ok(map) if !map.is_empty() => return map,
            Ok(_) => warn!("Mapping service returned no item URLs, falling back"),
            Err(e) => warn!("Mapping service unavailable, falling back: {e:#}"),
        }
        site_mapper::map_from_root(self.config.base_url()).await
    }

    /// Is this item's record already on disk from an earlier run?
    fn should_skip(&self, category: Category, slug: &str) -> bool {
        !self.config.force()
            && artifacts::json_path(self.config.output_dir(), category, slug).exists()
    }

    async fn scrape_item(
        &self,
        browser: &Browser,
        category: Category,
        url: &str,
        slug: &str,
        stats: &mut RunStats,
    ) {
        let root = self.config.output_dir();

        info!("Scraping {url}");
        let (mut payload, stage, page) = self.extract(browser, url, slug).await;

        match stage {
            Stage::Service => {
                stats.service_extracted += 1;
                stats.successful += 1;
            }
            Stage::Browser => {
                stats.browser_fallback += 1;
                stats.successful += 1;
            }
            Stage::Failed => stats.failed += 1,
        }

        payload.category = Some(category);
        payload.scraped_at = Some(chrono::Utc::now().to_rfc3339());

        if let Some(page) = &page
            && stage != Stage::Failed
        {
            let preview = artifacts::preview_path(root, category, slug);
            if let Some(parent) = preview.parent()
                && let Err(e) = tokio::fs::create_dir_all(parent).await
            {
                warn!("Could not create {}: {e}", parent.display());
            }
            match capture_preview(page, &preview).await {
                Ok(()) => {
                    payload.preview_image = preview
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(str::to_string);
                }
                Err(e) => warn!("Preview capture failed for {slug}: {e:#}"),
            }
        }

        if let Err(e) = write_artifacts(root, category, slug, &payload, stage).await {
            error!("Failed to write record for {slug}: {e:#}");
        }

        if let Some(page) = page
            && let Err(e) = page.close().await
        {
            debug!("Page close reported for {slug}: {e}");
        }
    }

    /// Run the extraction ladder for one item.
    ///
    /// The page is opened regardless of which stage wins, since the preview
    /// screenshot needs it; a page that cannot open only fails the item when
    /// the service stage also produced nothing.
    async fn extract(
        &self,
        browser: &Browser,
        url: &str,
        slug: &str,
    ) -> (ComponentPayload, Stage, Option<Page>) {
        let service_payload = match self.firecrawl.extract_component(url).await {
            Ok(ExtractOutcome::Usable(payload)) => Some(payload),
            Ok(ExtractOutcome::Unusable { reason }) => {
                debug!("Service extraction unusable for {slug}: {reason}");
                None
            }
            Err(e) => {
                debug!("Service extraction errored for {slug}: {e:#}");
                None
            }
        };

        let page = match open_item_page(browser, url, &self.config).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!("Could not open page for {slug}: {e:#}");
                None
            }
        };

        if let Some(payload) = service_payload {
            return (payload, Stage::Service, page);
        }

        match &page {
            Some(open) => match extract_from_page(open, url).await {
                Ok(payload) if payload.is_usable() => (payload, Stage::Browser, page),
                Ok(payload) => {
                    warn!("Browser extraction unusable for {slug} (name: {:?})", payload.name);
                    (
                        ComponentPayload::failure(url, slug, "no usable data extracted"),
                        Stage::Failed,
                        page,
                    )
                }
                Err(e) => {
                    warn!("Browser extraction failed for {slug}: {e:#}");
                    (
                        ComponentPayload::failure(url, slug, &format!("{e:#}")),
                        Stage::Failed,
                        page,
                    )
                }
            },
            None => (
                ComponentPayload::failure(url, slug, "page failed to open"),
                Stage::Failed,
                None,
            ),
        }
    }

    /// Sleep between scraped items: a fixed base plus random jitter so the
    /// request rhythm is not perfectly periodic. Skipped items make no network
    /// calls and do not throttle.
    async fn throttle(&self) {
        let base = self.config.throttle_base_ms();
        let jitter = self.config.throttle_jitter_ms();
        let extra = if jitter > 0 {
            rand::rng().random_range(0..jitter)
        } else {
            0
        };
        tokio::time::sleep(Duration::from_millis(base + extra)).await;
    }
}

/// Persist one item's artifacts.
///
/// A failed stage writes nothing at all; the absent record keeps the item
/// eligible for retry on the next run, and the store never sees it.
async fn write_artifacts(
    root: &Path,
    category: Category,
    slug: &str,
    payload: &ComponentPayload,
    stage: Stage,
) -> Result<()> {
    if stage == Stage::Failed {
        debug!("No artifacts for {slug}; it will be retried next run");
        return Ok(());
    }

    artifacts::write_payload_json(root, category, slug, payload).await?;
    if let Err(e) = artifacts::write_code_artifact(root, category, slug, payload).await {
        warn!("Failed to write code artifact for {slug}: {e:#}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_for(dir: &Path, force: bool) -> ScrapeEngine {
        let config = ScrapeConfig::builder(dir)
            .force(force)
            .api_key("k")
            .build()
            .expect("config");
        ScrapeEngine::with_client(config, FirecrawlClient::new("k"))
    }

    #[test]
    fn engine_builds_from_config() {
        let config = ScrapeConfig::builder("/tmp/out")
            .api_key("k")
            .build()
            .expect("config");
        let engine = ScrapeEngine::with_client(config, FirecrawlClient::new("k"));
        assert_eq!(engine.config.base_url(), crate::utils::constants::GALLERY_BASE_URL);
    }

    #[tokio::test]
    async fn failed_items_leave_no_artifact_and_stay_retryable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let engine = engine_for(dir.path(), false);

        let payload = ComponentPayload::failure(
            "https://www.reactbits.dev/components/dock",
            "dock",
            "navigation timed out",
        );
        write_artifacts(dir.path(), Category::Components, "dock", &payload, Stage::Failed)
            .await
            .expect("write");

        assert!(!artifacts::json_path(dir.path(), Category::Components, "dock").exists());
        assert!(!engine.should_skip(Category::Components, "dock"));
    }

    #[tokio::test]
    async fn successful_items_are_skipped_until_forced() {
        let dir = tempfile::tempdir().expect("tempdir");

        let payload = ComponentPayload {
            name: "Dock".to_string(),
            code: "export default function Dock() {}".to_string(),
            ..ComponentPayload::default()
        };
        write_artifacts(dir.path(), Category::Components, "dock", &payload, Stage::Browser)
            .await
            .expect("write");

        assert!(artifacts::json_path(dir.path(), Category::Components, "dock").exists());
        assert!(engine_for(dir.path(), false).should_skip(Category::Components, "dock"));
        assert!(!engine_for(dir.path(), true).should_skip(Category::Components, "dock"));
    }
}
