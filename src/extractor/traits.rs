use crate::extractor::models::RenderedPage;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Query used when waiting for an element in a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementQuery {
    XPath(String),
    Css(String),
}

impl ElementQuery {
    pub fn as_str(&self) -> &str {
        match self {
            ElementQuery::XPath(s) | ElementQuery::Css(s) => s,
        }
    }
}

/// An element found in the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    /// Displayed text, verbatim
    pub text: String,
}

/// Core trait for a live rendered-page session
///
/// This trait isolates the pipeline from how pages are actually rendered
/// (headless Chromium, a remote WebDriver, canned HTML in tests, ...).
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigates and returns the page once client-side rendering has settled
    async fn navigate(&self, url: &str) -> Result<RenderedPage>;

    async fn current_html(&self) -> Result<String>;

    async fn title(&self) -> Result<Option<String>>;

    async fn current_url(&self) -> Result<String>;

    /// Waits up to `timeout` for `query` to match; fails with `ElementTimeout`
    async fn wait_for_element(&self, query: &ElementQuery, timeout: Duration)
        -> Result<PageElement>;

    /// Releases the session; called exactly once on every exit path
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens rendered-page sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Returns a unique identifier for this launcher (e.g., "chromium")
    fn id(&self) -> &'static str;

    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

/// Close `session` and hand back `result` untouched.
///
/// A failing close is logged but never replaces the body's outcome.
pub async fn release<T>(session: Box<dyn PageSession>, result: Result<T>) -> Result<T> {
    if let Err(e) = session.close().await {
        warn!("Failed to close page session: {:#}", e);
    }
    result
}

/// Log title, URL and a prefix of the markup of a page that did not render
/// what we expected
pub(crate) async fn log_page_state(session: &dyn PageSession) {
    match session.title().await {
        Ok(title) => debug!("Page title: {:?}", title),
        Err(e) => debug!("Failed to read page title: {:#}", e),
    }
    if let Ok(url) = session.current_url().await {
        debug!("Page URL: {}", url);
    }
    if let Ok(html) = session.current_html().await {
        if html.len() < 10_000 {
            let prefix: String = html.chars().take(2000).collect();
            debug!("Page source prefix: {}", prefix);
        } else {
            debug!("Page source length: {} bytes", html.len());
        }
    }
}
