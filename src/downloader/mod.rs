//! Destination naming and payload download

pub mod fetcher;
pub mod naming;

// Re-export for convenience
pub use fetcher::{HttpFetcher, MediaFetcher};
pub use naming::{sanitize_filename, DestinationNamer};
