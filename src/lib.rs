//! Dyloader library

pub mod batch;
pub mod browser;
pub mod downloader;
pub mod extractor;
pub mod report;
pub mod utils;

// Re-export main types for easier use
pub use batch::{BatchEvent, BatchRequest, BatchRunner, ItemResult};
pub use browser::ChromiumLauncher;
pub use downloader::{DestinationNamer, HttpFetcher, MediaFetcher};
pub use extractor::{CandidateExtractor, CountScraper, ListingExtractor, PageSession, SessionLauncher};
pub use utils::{DyloaderError, Settings};
