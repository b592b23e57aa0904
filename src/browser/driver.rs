//! Browser executable discovery
//!
//! Search order:
//! 1. Explicit path from settings
//! 2. System PATH (Chromium, Chrome, Edge binary names)
//! 3. Common installation paths

use crate::utils::config::BrowserSettings;
use crate::utils::error::DyloaderError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Binary names looked up on PATH, in preference order
const BROWSER_BINARIES: [&str; 7] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "microsoft-edge",
    "microsoft-edge-stable",
    "msedge",
];

const COMMON_PATHS: [&str; 6] = [
    "/usr/bin/chromium",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Locate a Chromium-family browser; `DriverNotFound` when none exists
pub fn find_browser(settings: &BrowserSettings) -> Result<PathBuf> {
    if let Some(configured) = &settings.executable {
        if configured.is_file() {
            info!("✓ Using configured browser: {}", configured.display());
            return Ok(configured.clone());
        }
        warn!(
            "Configured browser does not exist: {}",
            configured.display()
        );
        return Err(DyloaderError::DriverNotFound(configured.display().to_string()).into());
    }

    if let Some(found) = find_in_path() {
        info!("✓ Using system browser: {}", found.display());
        return Ok(found);
    }

    if let Some(found) = find_in_common_paths() {
        info!("✓ Using browser from common path: {}", found.display());
        return Ok(found);
    }

    warn!("✗ No Chromium-family browser found");
    Err(DyloaderError::DriverNotFound(format!(
        "none of {} on PATH or in common locations",
        BROWSER_BINARIES.join(", ")
    ))
    .into())
}

fn find_in_path() -> Option<PathBuf> {
    BROWSER_BINARIES.iter().find_map(|name| {
        let path = which::which(name).ok()?;
        debug!("Found {} at {}", name, path.display());
        Some(path)
    })
}

fn find_in_common_paths() -> Option<PathBuf> {
    COMMON_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}
