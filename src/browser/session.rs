//! Headless Chromium page sessions (chromiumoxide)

use crate::browser::driver::find_browser;
use crate::extractor::models::RenderedPage;
use crate::extractor::traits::{ElementQuery, PageElement, PageSession, SessionLauncher};
use crate::utils::config::BrowserSettings;
use crate::utils::error::DyloaderError;
use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

fn browser_err(e: CdpError) -> anyhow::Error {
    DyloaderError::Browser(e.to_string()).into()
}

/// Launches one headless browser per session
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> Result<BrowserConfig> {
        let executable = find_browser(&self.settings)?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .window_size(self.settings.window_width, self.settings.window_height)
            .args(self.settings.args.clone());
        if !self.settings.headless {
            builder = builder.with_head();
        }
        builder
            .build()
            .map_err(|e| DyloaderError::DriverLaunchFailed(e).into())
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    fn id(&self) -> &'static str {
        "chromium"
    }

    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let config = self.config()?;

        info!("Starting headless browser...");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DyloaderError::DriverLaunchFailed(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Shut the fresh browser down before reporting
                let session = ChromiumSession {
                    browser: Some(browser),
                    page: None,
                    handler: Some(handler_task),
                    settings: self.settings.clone(),
                };
                if let Err(close_err) = Box::new(session).close().await {
                    warn!("Failed to close browser after page error: {:#}", close_err);
                }
                return Err(DyloaderError::DriverLaunchFailed(e.to_string()).into());
            }
        };

        info!("Browser started");
        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler_task),
            settings: self.settings.clone(),
        }))
    }
}

/// A running browser with a single tab
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    settings: BrowserSettings,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| DyloaderError::Browser("session has no open page".into()).into())
    }

    async fn find(&self, query: &ElementQuery) -> Result<Element> {
        let page = self.page()?;
        let found = match query {
            ElementQuery::XPath(xpath) => page.find_xpath(xpath.as_str()).await,
            ElementQuery::Css(css) => page.find_element(css.as_str()).await,
        };
        found.map_err(browser_err)
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<RenderedPage> {
        info!("Visiting {}", url);
        self.page()?.goto(url).await.map_err(browser_err)?;
        debug!("Page loaded, waiting {:?} for rendering", self.settings.settle_delay());
        sleep(self.settings.settle_delay()).await;

        Ok(RenderedPage {
            html: self.current_html().await?,
            title: self.title().await?,
            current_url: self.current_url().await?,
        })
    }

    async fn current_html(&self) -> Result<String> {
        self.page()?.content().await.map_err(browser_err)
    }

    async fn title(&self) -> Result<Option<String>> {
        self.page()?.get_title().await.map_err(browser_err)
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.page()?.url().await.map_err(browser_err)?;
        Ok(url.unwrap_or_default())
    }

    async fn wait_for_element(
        &self,
        query: &ElementQuery,
        wait: Duration,
    ) -> Result<PageElement> {
        let poll = self.settings.poll_interval();
        let found = timeout(wait, async {
            loop {
                match self.find(query).await {
                    Ok(element) => return element,
                    Err(_) => sleep(poll).await,
                }
            }
        })
        .await;

        let element = found.map_err(|_| DyloaderError::ElementTimeout {
            selector: query.as_str().to_string(),
            seconds: wait.as_secs(),
        })?;
        let text = element.inner_text().await.map_err(browser_err)?;
        Ok(PageElement {
            text: text.unwrap_or_default(),
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        if let Some(page) = this.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }
        if let Some(mut browser) = this.browser.take() {
            browser.close().await.map_err(browser_err)?;
            if let Err(e) = browser.wait().await {
                warn!("Browser process did not exit cleanly: {}", e);
            }
        }
        if let Some(handler) = this.handler.take() {
            handler.abort();
        }
        info!("Browser closed");
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Only reached without close(): dropping Browser kills the child process
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        if self.browser.is_some() {
            warn!("Browser session dropped without close()");
        }
    }
}
