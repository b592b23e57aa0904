//! Error handling for Dyloader

use thiserror::Error;

/// Main error type for Dyloader
#[derive(Debug, Error)]
pub enum DyloaderError {
    #[error("Network unreachable: {0}")]
    Unreachable(String),

    #[error("Browser driver not found: {0}")]
    DriverNotFound(String),

    #[error("Failed to launch browser: {0}")]
    DriverLaunchFailed(String),

    #[error("No media links found in page")]
    NoCandidates,

    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No items found on listing page")]
    NoItems,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {seconds}s waiting for element: {selector}")]
    ElementTimeout { selector: String, seconds: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            DyloaderError::NoCandidates.to_string(),
            "No media links found in page"
        );
        assert_eq!(DyloaderError::HttpStatus(403).to_string(), "HTTP error: 403");
        assert_eq!(
            DyloaderError::ElementTimeout {
                selector: "//span".to_string(),
                seconds: 15
            }
            .to_string(),
            "Timed out after 15s waiting for element: //span"
        );
    }
}
