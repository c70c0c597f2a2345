//! Browser-based extraction of gallery item pages.
//!
//! This is the fallback behind the structured-extraction service: navigate to
//! the item, reveal its code panel, and read the component record out of the
//! rendered DOM. Code retrieval has its own second fallback based on network
//! interception (see [`code_blocks`]).

pub mod code_blocks;
pub mod js_scripts;
pub mod schema;
pub mod screenshot;

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cleaner::clean_code_text;
use crate::config::ScrapeConfig;
use code_blocks::{extract_code_blocks, intercept_code_response};
use js_scripts::{CODE_TAB_CLICK_SCRIPT, COMPONENT_INFO_SCRIPT};
use schema::{ComponentPayload, PropInfo};

/// Raw shape returned by [`js_scripts::COMPONENT_INFO_SCRIPT`].
#[derive(Debug, Deserialize)]
struct DomInfo {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    props: Vec<DomProp>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DomProp {
    name: String,
    #[serde(default, rename = "type")]
    prop_type: String,
    #[serde(default)]
    default: String,
    #[serde(default)]
    description: String,
}

/// Navigate to an item page and reveal its code panel.
///
/// Navigation is bounded by the configured page-load timeout; a hung page
/// becomes a per-item error rather than stalling the run. After navigation the
/// code tab is clicked and the page given a settle window, since the panel
/// renders client-side with no completion signal.
pub async fn open_item_page(browser: &Browser, url: &str, config: &ScrapeConfig) -> Result<Page> {
    let timeout = Duration::from_secs(config.page_load_timeout_secs());

    let page = tokio::time::timeout(timeout, browser.new_page(url))
        .await
        .context("page navigation timed out")?
        .context("failed to open page")?;

    if let Err(e) = tokio::time::timeout(timeout, page.wait_for_navigation()).await {
        warn!("Navigation wait timed out for {url}: {e}");
    }

    match page.evaluate(CODE_TAB_CLICK_SCRIPT).await {
        Ok(result) => {
            let clicked: i64 = result.into_value().unwrap_or(0);
            debug!("Clicked {clicked} code-reveal elements on {url}");
        }
        Err(e) => warn!("Code tab click failed on {url}: {e}"),
    }

    tokio::time::sleep(Duration::from_millis(config.settle_delay_ms())).await;

    Ok(page)
}

/// Extract a component record from an already-open item page.
///
/// Name, description, props and dependencies come from DOM heuristics; code
/// comes from the visible code blocks, with network interception as a second
/// attempt when the DOM has none. The returned payload may still be unusable
/// (e.g. a placeholder name) — the caller decides what that means.
pub async fn extract_from_page(page: &Page, url: &str) -> Result<ComponentPayload> {
    let info: DomInfo = page
        .evaluate(COMPONENT_INFO_SCRIPT)
        .await
        .context("component info script failed")?
        .into_value()
        .context("component info script returned an unexpected shape")?;

    let mut code = extract_code_blocks(page).await.unwrap_or_default();

    if code.trim().is_empty() {
        debug!("No visible code blocks on {url}, trying network interception");
        match intercept_code_response(page).await {
            Ok(intercepted) => code = intercepted,
            Err(e) => warn!("Network interception failed on {url}: {e}"),
        }
    }

    let props = info
        .props
        .into_iter()
        .map(|p| {
            (
                p.name,
                PropInfo {
                    prop_type: p.prop_type,
                    default_value: p.default,
                    description: p.description,
                },
            )
        })
        .collect();

    Ok(ComponentPayload {
        name: info.name,
        description: info.description,
        props,
        dependencies: info.dependencies,
        code: clean_code_text(&code),
        url: url.to_string(),
        ..ComponentPayload::default()
    })
}
