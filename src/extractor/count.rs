//! Displayed item count on a profile page

use crate::extractor::traits::{log_page_state, release, ElementQuery, PageSession, SessionLauncher};
use crate::utils::config::Settings;
use crate::utils::error::DyloaderError;
use crate::utils::network::{ensure_http_url, ensure_reachable, Connectivity};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Count marker next to the "works" tab label
pub const PRIMARY_COUNT_XPATH: &str = "//span[contains(text(), '作品') or contains(text(), 'works')]//following-sibling::span[@data-e2e='user-tab-count']";

/// Any count marker on the page
pub const FALLBACK_COUNT_XPATH: &str = "//span[@data-e2e='user-tab-count']";

/// Selectors tried in order until one appears
pub fn count_queries() -> Vec<ElementQuery> {
    vec![
        ElementQuery::XPath(PRIMARY_COUNT_XPATH.to_string()),
        ElementQuery::XPath(FALLBACK_COUNT_XPATH.to_string()),
    ]
}

/// Reads the works count shown on a profile page
pub struct CountScraper {
    launcher: Arc<dyn SessionLauncher>,
    connectivity: Arc<dyn Connectivity>,
    settings: Arc<Settings>,
}

impl CountScraper {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        connectivity: Arc<dyn Connectivity>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            launcher,
            connectivity,
            settings,
        }
    }

    /// Return the displayed count text verbatim (separators and all).
    pub async fn scrape_count(&self, profile_url: &str) -> Result<String> {
        ensure_http_url(profile_url)?;
        ensure_reachable(self.connectivity.as_ref(), &self.settings.network).await?;

        let session = self.launcher.open().await?;
        let result = self.read_count(session.as_ref(), profile_url).await;
        release(session, result).await
    }

    async fn read_count(&self, session: &dyn PageSession, profile_url: &str) -> Result<String> {
        info!("Visiting {}", profile_url);
        session.navigate(profile_url).await?;

        let timeout = self.settings.browser.element_timeout();
        let queries = count_queries();
        for (attempt, query) in queries.iter().enumerate() {
            if attempt > 0 {
                info!("Trying fallback selector...");
            }
            match session.wait_for_element(query, timeout).await {
                Ok(element) => {
                    info!("Found works count: {}", element.text);
                    return Ok(element.text);
                }
                Err(e) => warn!("Selector {} failed: {:#}", query.as_str(), e),
            }
        }

        log_page_state(session).await;
        Err(DyloaderError::ElementNotFound(format!(
            "works count ({} selectors tried)",
            queries.len()
        ))
        .into())
    }
}
