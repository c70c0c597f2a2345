//! Code retrieval from an item page.
//!
//! Two stages: read the visible code blocks out of the DOM, and if that comes
//! up empty, re-trigger the code tab with a CDP network listener installed and
//! scan intercepted response bodies for source text.

use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams,
};
use futures::StreamExt;
use tracing::{debug, trace, warn};

use super::js_scripts::{CODE_TAB_CLICK_SCRIPT, code_blocks_script};
use crate::utils::constants::{CODE_BLOCK_SELECTORS, INTERCEPT_SETTLE_MS};

/// Extract visible code from the DOM.
///
/// Matching blocks are deduplicated by exact text in first-seen order and
/// joined with blank lines. Returns an empty string when nothing matched.
pub async fn extract_code_blocks(page: &Page) -> Result<String> {
    let result = page
        .evaluate(code_blocks_script(CODE_BLOCK_SELECTORS))
        .await
        .context("code block script failed")?;

    let blocks: Vec<String> = result
        .into_value()
        .context("code block script returned a non-array")?;

    let mut seen: Vec<String> = Vec::new();
    for block in blocks {
        if !seen.contains(&block) {
            seen.push(block);
        }
    }

    debug!("DOM code extraction found {} unique blocks", seen.len());
    Ok(seen.join("\n\n"))
}

/// Does this response look like it could carry component source?
fn is_code_candidate(event: &EventResponseReceived) -> bool {
    let url = event.response.url.to_lowercase();
    let mime = event.response.mime_type.to_lowercase();

    url.contains("code")
        || url.contains("snippet")
        || url.ends_with(".jsx")
        || url.ends_with(".tsx")
        || mime.contains("javascript")
        || mime.contains("json")
        || mime.contains("text")
}

/// Does this body read like JavaScript source rather than markup or data?
fn looks_like_source(body: &str) -> bool {
    ["import ", "function ", "export ", "const "]
        .iter()
        .any(|marker| body.contains(marker))
}

/// Network-interception fallback for pages that lazy-load their code panel.
///
/// Installs a response listener, re-clicks the code tab, then drains events
/// for a bounded settle window and returns the first response body that looks
/// like source text. Returns an empty string when nothing qualified.
pub async fn intercept_code_response(page: &Page) -> Result<String> {
    page.execute(EnableParams::default())
        .await
        .context("failed to enable network domain")?;

    let mut events = page
        .event_listener::<EventResponseReceived>()
        .await
        .context("failed to install response listener")?;

    // The listener has to be live before the tab click retriggers the fetch.
    if let Err(e) = page.evaluate(CODE_TAB_CLICK_SCRIPT).await {
        trace!("Code tab re-click failed during interception: {e}");
    }

    let mut candidates = Vec::new();
    let settle = tokio::time::sleep(Duration::from_millis(INTERCEPT_SETTLE_MS));
    tokio::pin!(settle);

    loop {
        tokio::select! {
            event = events.next() => {
                match event {
                    Some(event) if is_code_candidate(&event) => candidates.push(event),
                    Some(_) => {}
                    None => break,
                }
            }
            () = &mut settle => break,
        }
    }

    debug!(
        "Interception window closed with {} candidate responses",
        candidates.len()
    );

    for event in candidates {
        let body = match page
            .execute(GetResponseBodyParams::new(event.request_id.clone()))
            .await
        {
            Ok(response) => {
                if response.base64_encoded {
                    match general_purpose::STANDARD.decode(&response.body) {
                        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                        Err(e) => {
                            warn!("Failed to decode intercepted body: {e}");
                            continue;
                        }
                    }
                } else {
                    response.body.clone()
                }
            }
            // Bodies are evicted once the page navigates or GC runs; skip.
            Err(e) => {
                trace!("Response body unavailable for {}: {e}", event.response.url);
                continue;
            }
        };

        if looks_like_source(&body) {
            debug!("Intercepted code from {}", event.response.url);
            return Ok(body);
        }
    }

    Ok(String::new())
}
