//! Application configuration

use crate::utils::error::DyloaderError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Spoofed desktop browser identity used for media requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Application settings
///
/// Built once at startup and handed to every collaborator; nothing mutates it afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub http: HttpSettings,
    pub network: NetworkSettings,
    pub platform: PlatformSettings,
}

/// Headless browser launch options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Explicit browser executable; searched for when unset
    pub executable: Option<PathBuf>,

    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,

    /// Extra command-line flags passed to the browser
    pub args: Vec<String>,

    /// Pause after navigation so client-side rendering can settle (seconds)
    pub settle_delay_secs: u64,

    /// Upper bound when waiting for a specific element (seconds)
    pub element_timeout_secs: u64,

    /// Poll interval while waiting for an element (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            args: [
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--disable-web-security",
                "--allow-running-insecure-content",
                "--ignore-certificate-errors",
                "--ignore-ssl-errors",
                "--disable-extensions",
                "--disable-plugins",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            settle_delay_secs: 5,
            element_timeout_secs: 15,
            poll_interval_ms: 500,
        }
    }
}

impl BrowserSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Media request options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub referer: String,

    /// Chunk size for streaming (bytes)
    pub chunk_size: usize,

    /// Whole-request timeout (seconds), 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://www.douyin.com/".to_string(),
            chunk_size: 8192, // 8KB
            request_timeout_secs: 0,
        }
    }
}

/// Reachability probe options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub probe_url: String,
    pub probe_timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            probe_url: "https://www.douyin.com".to_string(),
            probe_timeout_secs: 10,
        }
    }
}

impl NetworkSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Where listings live and how item links look
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Prefixed to relative item links
    pub origin: String,

    /// Href prefix identifying an item-detail link
    pub item_path_prefix: String,

    /// Base name used when a page has neither an explicit name nor a title
    pub fallback_name_prefix: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            origin: "https://www.douyin.com".to_string(),
            item_path_prefix: "/video/".to_string(),
            fallback_name_prefix: "douyin_audio_".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the per-user config file when present.
    ///
    /// Falls back to defaults when no file is found. An explicit path that
    /// cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw).map_err(DyloaderError::from)?;
        Ok(settings)
    }

    /// Reject values that would stall or break the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.http.chunk_size == 0 {
            return Err(DyloaderError::Config("http.chunk_size must be > 0".into()).into());
        }
        if self.browser.element_timeout_secs == 0 {
            return Err(
                DyloaderError::Config("browser.element_timeout_secs must be > 0".into()).into(),
            );
        }
        if self.network.probe_timeout_secs == 0 {
            return Err(
                DyloaderError::Config("network.probe_timeout_secs must be > 0".into()).into(),
            );
        }
        if !self.platform.origin.starts_with("http") {
            return Err(DyloaderError::Config(format!(
                "platform.origin is not an http(s) URL: {}",
                self.platform.origin
            ))
            .into());
        }
        Ok(())
    }
}

/// `<config_dir>/dyloader/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dyloader").join("config.json"))
}
