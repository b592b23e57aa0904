use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progress of a batch run, in the order things happen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// The listing page yielded these item URLs
    ItemsFound { urls: Vec<String> },
    /// Work on one item began (index is 1-based)
    ItemStarted {
        index: usize,
        total: usize,
        url: String,
    },
    /// A media URL was chosen for the item
    MediaSelected { index: usize, media_url: String },
    /// Bytes are about to be written to this path
    Downloading { index: usize, path: PathBuf },
    /// The item was saved
    ItemSaved {
        index: usize,
        url: String,
        file_path: PathBuf,
    },
    /// The item failed; the batch continues
    ItemFailed {
        index: usize,
        url: String,
        error: String,
    },
}

impl BatchEvent {
    /// One human-readable status line
    pub fn describe(&self) -> String {
        match self {
            BatchEvent::ItemsFound { urls } => {
                let mut line = format!("Found {} video(s)", urls.len());
                for (i, url) in urls.iter().enumerate() {
                    line.push_str(&format!("\nVideo {}: {}", i + 1, url));
                }
                line
            }
            BatchEvent::ItemStarted { index, total, url } => {
                format!("[{}/{}] Processing {}", index, total, url)
            }
            BatchEvent::MediaSelected { media_url, .. } => {
                format!("Found audio link: {}", media_url)
            }
            BatchEvent::Downloading { path, .. } => {
                format!("Downloading audio to: {}", path.display())
            }
            BatchEvent::ItemSaved { file_path, .. } => {
                format!("Audio saved to: {}", file_path.display())
            }
            BatchEvent::ItemFailed { url, error, .. } => {
                format!("Failed to download audio for {}: {}", url, error)
            }
        }
    }
}
