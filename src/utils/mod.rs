//! Utility modules for error handling, configuration and connectivity

pub mod config;
pub mod error;
pub mod network;

// Re-export for convenience
pub use config::Settings;
pub use error::DyloaderError;
pub use network::{Connectivity, HttpConnectivity};
