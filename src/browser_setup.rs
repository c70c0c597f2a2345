//! Headless browser discovery and launch.
//!
//! Finds a system Chrome/Chromium, falling back to a managed download, and
//! launches it with the settings the gallery tolerates. The CDP event stream
//! is drained by a background task for the lifetime of the browser.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{info, trace, warn};

use crate::utils::constants::CHROME_USER_AGENT;

/// Find a Chrome/Chromium executable with platform-specific search paths.
///
/// The `CHROMIUM_PATH` environment variable overrides all other methods.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    } else if cfg!(target_os = "macos") {
        let mut paths: Vec<PathBuf> = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
        }
        paths
    } else {
        [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    };

    for path in candidates {
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            let output = Command::new("which").arg(cmd).output();
            if let Ok(output) = output
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser via 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium build and return its executable path.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir())
        .join("bitscrape")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Find or download a browser and launch it.
///
/// Returns the browser handle, the handler task draining the CDP event
/// stream, and the user data directory in use. The handler task filters out
/// the untagged-enum deserialization noise chromiumoxide emits for CDP events
/// it does not recognize.
pub async fn launch_browser(headless: bool) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let user_data_dir =
        std::env::temp_dir().join(format!("bitscrape_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1280, 800)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path);

    if headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();

                // Known non-fatal CDP serialization noise; see
                // https://github.com/mattsse/chromiumoxide/issues/167
                let is_benign = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign {
                    trace!("Suppressed benign CDP serialization error: {error_msg}");
                } else {
                    warn!("Browser handler error: {error_msg}");
                }
            }
        }
        trace!("Browser handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}
