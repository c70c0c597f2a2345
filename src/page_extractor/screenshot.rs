//! Preview screenshot capture.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, Viewport,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::js_scripts::{PREVIEW_RECT_SCRIPT, READY_STATE_SCRIPT};

#[derive(Debug, Deserialize)]
struct PreviewRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct ReadyState {
    #[serde(rename = "readyState")]
    ready_state: String,
    #[serde(rename = "bodyExists")]
    body_exists: bool,
}

/// Poll until the document reports `readyState === 'complete'`.
///
/// `wait_for_navigation` returns on the HTTP response, before client-side
/// rendering; without this wait, screenshots of the gallery come out blank.
/// Gives up after `max_wait` and proceeds anyway.
pub async fn wait_for_render(page: &Page, max_wait: Duration) {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    while start.elapsed() < max_wait {
        if let Ok(result) = page.evaluate(READY_STATE_SCRIPT).await
            && let Ok(state) = result.into_value::<ReadyState>()
            && state.ready_state == "complete"
            && state.body_exists
        {
            debug!("Page rendered after {:.2}s", start.elapsed().as_secs_f64());
            return;
        }
        tokio::time::sleep(poll_interval).await;
    }

    warn!(
        "Page did not report complete within {:.0}s, capturing anyway",
        max_wait.as_secs_f64()
    );
}

/// Capture a PNG of the item's preview pane into `output_path`.
///
/// Clips to the preview element when one with a positive area is found,
/// otherwise captures the whole viewport.
pub async fn capture_preview(page: &Page, output_path: &Path) -> Result<()> {
    wait_for_render(page, Duration::from_secs(10)).await;

    let mut params = CaptureScreenshotParams {
        format: Some(CaptureScreenshotFormat::Png),
        ..Default::default()
    };

    match page.evaluate(PREVIEW_RECT_SCRIPT).await {
        Ok(result) => {
            if let Ok(Some(rect)) = result.into_value::<Option<PreviewRect>>() {
                debug!(
                    "Clipping preview to {}x{} at ({}, {})",
                    rect.width, rect.height, rect.x, rect.y
                );
                params.clip = Some(Viewport {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    scale: 1.0,
                });
            }
        }
        Err(e) => debug!("Preview rect probe failed, using viewport: {e}"),
    }

    let png = page
        .screenshot(params)
        .await
        .context("screenshot capture failed")?;

    tokio::fs::write(output_path, png)
        .await
        .with_context(|| format!("failed to write screenshot to {}", output_path.display()))?;

    debug!("Saved preview screenshot to {}", output_path.display());
    Ok(())
}
