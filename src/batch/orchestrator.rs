//! Sequential listing → per-item download pipeline

use crate::batch::events::BatchEvent;
use crate::downloader::fetcher::MediaFetcher;
use crate::downloader::naming::DestinationNamer;
use crate::extractor::candidates::CandidateExtractor;
use crate::extractor::listing::ListingExtractor;
use crate::extractor::models::{ListingItem, SelectionResult};
use crate::extractor::selector::select;
use crate::extractor::traits::{log_page_state, release, PageSession, SessionLauncher};
use crate::utils::config::Settings;
use crate::utils::error::DyloaderError;
use crate::utils::network::{ensure_http_url, ensure_reachable, Connectivity};
use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What to download and where
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub listing_url: String,
    pub max_count: usize,
    pub output_dir: PathBuf,
    pub explicit_name: Option<String>,
}

/// Outcome of one batch item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Saved { file_path: PathBuf },
    Failed { error: String },
}

/// Result record for one listing item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub source_url: String,
    pub outcome: ItemOutcome,
}

impl ItemResult {
    pub fn saved(source_url: impl Into<String>, file_path: PathBuf) -> Self {
        Self {
            source_url: source_url.into(),
            outcome: ItemOutcome::Saved { file_path },
        }
    }

    pub fn failed(source_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            outcome: ItemOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Saved { .. })
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.outcome {
            ItemOutcome::Saved { file_path } => Some(file_path),
            ItemOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ItemOutcome::Saved { .. } => None,
            ItemOutcome::Failed { error } => Some(error),
        }
    }
}

/// Drives listing extraction and then every item, one at a time
pub struct BatchRunner {
    launcher: Arc<dyn SessionLauncher>,
    fetcher: Arc<dyn MediaFetcher>,
    connectivity: Arc<dyn Connectivity>,
    settings: Arc<Settings>,
    candidates: CandidateExtractor,
    listing: ListingExtractor,
    namer: DestinationNamer,
    events: Option<mpsc::Sender<BatchEvent>>,
}

impl BatchRunner {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        fetcher: Arc<dyn MediaFetcher>,
        connectivity: Arc<dyn Connectivity>,
        settings: Arc<Settings>,
    ) -> Self {
        let listing = ListingExtractor::new(
            &settings.platform.origin,
            &settings.platform.item_path_prefix,
        );
        let namer = DestinationNamer::new(settings.platform.fallback_name_prefix.clone());
        Self {
            launcher,
            fetcher,
            connectivity,
            settings,
            candidates: CandidateExtractor::new(),
            listing,
            namer,
            events: None,
        }
    }

    /// Report progress on `tx` while running
    pub fn with_events(mut self, tx: mpsc::Sender<BatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Run the whole batch.
    ///
    /// Fails as a whole only before any item is touched (bad URL, no network,
    /// listing session failure, no items). After that every item produces an
    /// [`ItemResult`], in listing order, whatever happens to its siblings.
    pub async fn run(&self, request: &BatchRequest) -> Result<Vec<ItemResult>> {
        ensure_http_url(&request.listing_url)?;
        ensure_reachable(self.connectivity.as_ref(), &self.settings.network).await?;
        self.prepare_output_dir(&request.output_dir).await?;

        let items = self
            .fetch_listing(&request.listing_url, request.max_count)
            .await?;
        if items.is_empty() {
            return Err(DyloaderError::NoItems.into());
        }
        self.emit(BatchEvent::ItemsFound {
            urls: items.iter().map(|i| i.detail_url.clone()).collect(),
        })
        .await;

        let total = items.len();
        let mut results = Vec::with_capacity(total);
        for (i, item) in items.iter().enumerate() {
            let index = i + 1;
            let url = item.detail_url.as_str();
            self.emit(BatchEvent::ItemStarted {
                index,
                total,
                url: url.to_string(),
            })
            .await;

            let result = match self.process_item(index, url, request).await {
                Ok(file_path) => {
                    info!("Item {}/{} saved to {}", index, total, file_path.display());
                    self.emit(BatchEvent::ItemSaved {
                        index,
                        url: url.to_string(),
                        file_path: file_path.clone(),
                    })
                    .await;
                    ItemResult::saved(url, file_path)
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    error!("Item {}/{} failed: {}", index, total, message);
                    self.emit(BatchEvent::ItemFailed {
                        index,
                        url: url.to_string(),
                        error: message.clone(),
                    })
                    .await;
                    ItemResult::failed(url, message)
                }
            };
            results.push(result);
        }

        let saved = results.iter().filter(|r| r.success()).count();
        info!("Batch finished: {}/{} item(s) saved", saved, total);
        Ok(results)
    }

    async fn prepare_output_dir(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            tokio::fs::create_dir_all(output_dir)
                .await
                .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
        }
        let shown = output_dir
            .absolutize()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| output_dir.display().to_string());
        info!("Output directory: {}", shown);
        Ok(())
    }

    /// Open a session on the listing page and collect up to `max_count` items
    pub async fn fetch_listing(&self, listing_url: &str, max_count: usize) -> Result<Vec<ListingItem>> {
        let session = self.launcher.open().await?;
        let result = async {
            let page = session.navigate(listing_url).await?;
            Ok(self.listing.extract(&page.html, max_count))
        }
        .await;
        release(session, result).await
    }

    /// Extract → select → name → fetch for one item page
    async fn process_item(&self, index: usize, url: &str, request: &BatchRequest) -> Result<PathBuf> {
        let session = self.launcher.open().await?;
        let resolved = self.resolve_media(session.as_ref(), url).await;
        let (selection, title) = release(session, resolved).await?;

        self.emit(BatchEvent::MediaSelected {
            index,
            media_url: selection.url.clone(),
        })
        .await;

        let destination = self.namer.name(
            request.explicit_name.as_deref(),
            title.as_deref(),
            selection.extension,
            &request.output_dir,
        );
        self.emit(BatchEvent::Downloading {
            index,
            path: destination.path.clone(),
        })
        .await;

        self.fetcher
            .fetch(&selection.url, &destination.path)
            .await
            .with_context(|| format!("Failed to download {}", selection.url))?;
        Ok(destination.path)
    }

    async fn resolve_media(
        &self,
        session: &dyn PageSession,
        url: &str,
    ) -> Result<(SelectionResult, Option<String>)> {
        let page = session.navigate(url).await?;
        let candidates = match self.candidates.extract(&page.html) {
            Ok(candidates) => candidates,
            Err(e) => {
                log_page_state(session).await;
                return Err(e);
            }
        };
        debug!("{} candidate(s) on {}", candidates.len(), url);

        let selection = select(&candidates).ok_or(DyloaderError::NoCandidates)?;
        info!("Found audio link: {}", selection.url);
        Ok((selection, page.display_title()))
    }

    async fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            if let Err(e) = tx.send(event).await {
                warn!("Failed to send batch event: {}", e);
            }
        }
    }
}
