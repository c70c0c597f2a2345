//! Configuration for scrape runs.
//!
//! Provides `ScrapeConfig` and a fluent builder with validation and sensible
//! defaults. The config is constructed once by the CLI and threaded through
//! the orchestrator; nothing reads process-wide state after construction.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    CODE_REVEAL_SETTLE_MS, GALLERY_BASE_URL, PAGE_LOAD_TIMEOUT_SECS, THROTTLE_BASE_MS,
    THROTTLE_JITTER_MS,
};

/// Environment variable holding the structured-extraction service API key.
pub const API_KEY_ENV: &str = "FIRECRAWL_API_KEY";

/// Fallback key used when the environment variable is unset.
///
/// The extraction service rejects it, which pushes every item down to the
/// browser fallback — useful for offline development.
pub const API_KEY_FALLBACK: &str = "fc-local-dev-placeholder";

/// Configuration for one scrape run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Root of the artifact tree; one subdirectory per category.
    pub(crate) output_dir: PathBuf,
    pub(crate) base_url: String,
    /// Per-category item cap. `None` means unbounded.
    pub(crate) limit: Option<usize>,
    /// Re-scrape items whose JSON artifact already exists.
    pub(crate) force: bool,
    pub(crate) headless: bool,
    pub(crate) throttle_base_ms: u64,
    pub(crate) throttle_jitter_ms: u64,
    pub(crate) page_load_timeout_secs: Option<u64>,
    pub(crate) settle_delay_ms: Option<u64>,
    /// Extraction-service API key; not logged.
    #[serde(skip_serializing)]
    pub(crate) api_key: String,
}

impl ScrapeConfig {
    pub fn builder(output_dir: impl Into<PathBuf>) -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::new(output_dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    pub fn throttle_base_ms(&self) -> u64 {
        self.throttle_base_ms
    }

    pub fn throttle_jitter_ms(&self) -> u64 {
        self.throttle_jitter_ms
    }

    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
            .unwrap_or(PAGE_LOAD_TIMEOUT_SECS)
    }

    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay_ms.unwrap_or(CODE_REVEAL_SETTLE_MS)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Fluent builder for [`ScrapeConfig`].
#[derive(Debug, Clone)]
pub struct ScrapeConfigBuilder {
    output_dir: PathBuf,
    base_url: String,
    limit: Option<usize>,
    force: bool,
    headless: bool,
    throttle_base_ms: u64,
    throttle_jitter_ms: u64,
    page_load_timeout_secs: Option<u64>,
    settle_delay_ms: Option<u64>,
    api_key: Option<String>,
}

impl ScrapeConfigBuilder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_url: GALLERY_BASE_URL.to_string(),
            limit: None,
            force: false,
            headless: true,
            throttle_base_ms: THROTTLE_BASE_MS,
            throttle_jitter_ms: THROTTLE_JITTER_MS,
            page_load_timeout_secs: None,
            settle_delay_ms: None,
            api_key: None,
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn throttle(mut self, base_ms: u64, jitter_ms: u64) -> Self {
        self.throttle_base_ms = base_ms;
        self.throttle_jitter_ms = jitter_ms;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn settle_delay_ms(mut self, millis: u64) -> Self {
        self.settle_delay_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Validate and build the config.
    ///
    /// The API key falls back to the `FIRECRAWL_API_KEY` environment variable,
    /// then to the development placeholder.
    pub fn build(self) -> Result<ScrapeConfig> {
        if self.base_url.is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| anyhow!("invalid base_url '{}': {e}", self.base_url))?;

        if let Some(0) = self.limit {
            return Err(anyhow!("limit must be at least 1 when set"));
        }

        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_else(|| API_KEY_FALLBACK.to_string());

        Ok(ScrapeConfig {
            output_dir: self.output_dir,
            base_url: self.base_url,
            limit: self.limit,
            force: self.force,
            headless: self.headless,
            throttle_base_ms: self.throttle_base_ms,
            throttle_jitter_ms: self.throttle_jitter_ms,
            page_load_timeout_secs: self.page_load_timeout_secs,
            settle_delay_ms: self.settle_delay_ms,
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = ScrapeConfig::builder("/tmp/out")
            .api_key("k")
            .build()
            .expect("valid config");
        assert_eq!(config.base_url(), GALLERY_BASE_URL);
        assert_eq!(config.limit(), None);
        assert!(!config.force());
        assert!(config.headless());
        assert_eq!(config.page_load_timeout_secs(), PAGE_LOAD_TIMEOUT_SECS);
        assert_eq!(config.settle_delay_ms(), CODE_REVEAL_SETTLE_MS);
    }

    #[test]
    fn builder_rejects_zero_limit() {
        assert!(
            ScrapeConfig::builder("/tmp/out")
                .limit(Some(0))
                .api_key("k")
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_rejects_invalid_base_url() {
        assert!(
            ScrapeConfig::builder("/tmp/out")
                .base_url("not a url")
                .api_key("k")
                .build()
                .is_err()
        );
    }
}
