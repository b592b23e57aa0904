//! Machine-readable output records for the CLI

use crate::batch::ItemResult;
use serde::Serialize;

/// Per-item record of an audio batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AudioReport {
    Saved {
        success: bool,
        file_path: String,
        message: String,
        video_url: String,
    },
    Failed {
        success: bool,
        error: String,
        video_url: String,
    },
}

impl AudioReport {
    pub fn from_item(item: &ItemResult) -> Self {
        match (item.file_path(), item.error()) {
            (Some(path), _) => {
                let file_path = path.display().to_string();
                AudioReport::Saved {
                    success: true,
                    message: saved_message(&file_path),
                    file_path,
                    video_url: item.source_url.clone(),
                }
            }
            (None, error) => AudioReport::Failed {
                success: false,
                error: error.unwrap_or_default().to_string(),
                video_url: item.source_url.clone(),
            },
        }
    }
}

/// Line shown for a saved item in either output mode
pub fn saved_message(file_path: &str) -> String {
    format!("Audio saved to: {}", file_path)
}

/// Result of the count operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CountReport {
    Found {
        success: bool,
        number: String,
        message: String,
        url: String,
    },
    Failed {
        success: bool,
        error: String,
        url: String,
    },
}

impl CountReport {
    pub fn found(url: &str, number: String) -> Self {
        CountReport::Found {
            success: true,
            message: format!("Works count for {}: {}", url, number),
            number,
            url: url.to_string(),
        }
    }

    pub fn failed(url: &str, error: &anyhow::Error) -> Self {
        CountReport::Failed {
            success: false,
            error: format!("{:#}", error),
            url: url.to_string(),
        }
    }
}

/// Emitted instead of a batch array when the operation fails as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
}

impl FailureReport {
    pub fn new(error: &anyhow::Error) -> Self {
        Self {
            success: false,
            error: format!("{:#}", error),
        }
    }
}
