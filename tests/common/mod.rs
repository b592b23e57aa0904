//! In-process stand-ins for the browser, the network probe and the fetcher.
#![allow(dead_code)]

pub mod media_server;

use anyhow::Result;
use async_trait::async_trait;
use dyloader::downloader::MediaFetcher;
use dyloader::extractor::models::RenderedPage;
use dyloader::extractor::traits::{ElementQuery, PageElement, PageSession, SessionLauncher};
use dyloader::utils::{Connectivity, DyloaderError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ORIGIN: &str = "https://www.douyin.com";

/// Absolute detail URL for a `/video/<id>` link
pub fn video_url(id: &str) -> String {
    format!("{}/video/{}", ORIGIN, id)
}

/// Listing markup linking to `/video/<id>` for each id
pub fn listing_html(ids: &[&str]) -> String {
    let links: String = ids
        .iter()
        .map(|id| format!(r#"<li><a href="/video/{}">item {}</a></li>"#, id, id))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", links)
}

/// Item markup whose JSON state carries one escaped `playAddr`
pub fn item_html(title: &str, media_url: &str) -> String {
    format!(
        r#"<html><head><title>{}</title></head><body><script>window._ROUTER_DATA = {{"playAddr":"{}"}};</script></body></html>"#,
        title,
        media_url.replace('/', "\\/")
    )
}

/// Shared counters so tests can check every opened session got closed
#[derive(Debug, Default)]
pub struct SessionStats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl SessionStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

/// Serves canned pages keyed by URL
#[derive(Default)]
pub struct FakeLauncher {
    pages: HashMap<String, String>,
    elements: HashMap<String, String>,
    fail_open_after: Option<usize>,
    pub stats: Arc<SessionStats>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make `wait_for_element` find `query` with the given text
    pub fn with_element(mut self, query: &str, text: &str) -> Self {
        self.elements.insert(query.to_string(), text.to_string());
        self
    }

    /// Let the first `n` sessions open, then refuse to launch
    pub fn fail_open_after(mut self, n: usize) -> Self {
        self.fail_open_after = Some(n);
        self
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn open(&self) -> Result<Box<dyn PageSession>> {
        if let Some(limit) = self.fail_open_after {
            if self.stats.opened() >= limit {
                return Err(DyloaderError::DriverLaunchFailed("fake launch refused".into()).into());
            }
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            elements: self.elements.clone(),
            current: Mutex::new(None),
            stats: Arc::clone(&self.stats),
        }))
    }
}

pub struct FakeSession {
    pages: HashMap<String, String>,
    elements: HashMap<String, String>,
    current: Mutex<Option<RenderedPage>>,
    stats: Arc<SessionStats>,
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<RenderedPage> {
        self.stats.navigations.lock().unwrap().push(url.to_string());
        let html = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| DyloaderError::Browser(format!("no such page: {}", url)))?;
        let page = RenderedPage {
            html,
            title: None,
            current_url: url.to_string(),
        };
        *self.current.lock().unwrap() = Some(page.clone());
        Ok(page)
    }

    async fn current_html(&self) -> Result<String> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.html.clone())
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.current_url.clone())
            .unwrap_or_default())
    }

    async fn wait_for_element(&self, query: &ElementQuery, timeout: Duration) -> Result<PageElement> {
        match self.elements.get(query.as_str()) {
            Some(text) => Ok(PageElement { text: text.clone() }),
            None => Err(DyloaderError::ElementTimeout {
                selector: query.as_str().to_string(),
                seconds: timeout.as_secs(),
            }
            .into()),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Network probe with a fixed answer that counts how often it was asked
pub struct FixedConnectivity {
    reachable: bool,
    pub probes: AtomicUsize,
}

impl FixedConnectivity {
    pub fn up() -> Self {
        Self {
            reachable: true,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            reachable: false,
            probes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Connectivity for FixedConnectivity {
    async fn is_reachable(&self, _probe_url: &str, _timeout: Duration) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }
}

/// Writes a small marker file instead of downloading
#[derive(Default)]
pub struct RecordingFetcher {
    failing: HashSet<String>,
    pub calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with an HTTP 404
    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        if self.failing.contains(url) {
            return Err(DyloaderError::HttpStatus(404).into());
        }
        let body = format!("audio from {}", url);
        tokio::fs::write(destination, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }
}
