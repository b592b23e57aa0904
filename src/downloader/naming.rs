//! Collision-safe destination file names
//!
//! Names are `{base}_{unix_ts}{ext}`, with `_{n}` inserted before the
//! extension while the path already exists. The existence check and the later
//! file creation are separate steps, so two processes racing on the same
//! directory can still pick the same path.

use crate::extractor::models::{DestinationName, MediaExtension};
use chrono::Utc;
use std::path::Path;
use tracing::debug;

/// Title-derived base names are cut to this many characters
pub const MAX_BASE_NAME_CHARS: usize = 50;

/// Characters invalid on Windows/macOS/Linux filesystems
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace filesystem-illegal characters (and ASCII control characters) with `_`.
///
/// Safe input comes back unchanged.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || (c as u32) < 0x20 {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Sanitize a page title and keep at most [`MAX_BASE_NAME_CHARS`] characters
pub fn title_base_name(title: &str) -> String {
    sanitize_filename(title)
        .chars()
        .take(MAX_BASE_NAME_CHARS)
        .collect()
}

/// Derives base names and picks a path that does not exist yet
#[derive(Debug, Clone)]
pub struct DestinationNamer {
    fallback_prefix: String,
}

impl DestinationNamer {
    pub fn new(fallback_prefix: impl Into<String>) -> Self {
        Self {
            fallback_prefix: fallback_prefix.into(),
        }
    }

    /// Name a file in `output_dir` using the current Unix time
    pub fn name(
        &self,
        explicit_name: Option<&str>,
        page_title: Option<&str>,
        extension: MediaExtension,
        output_dir: &Path,
    ) -> DestinationName {
        let timestamp = Utc::now().timestamp();
        self.name_at(explicit_name, page_title, extension, output_dir, timestamp)
    }

    /// Same as [`name`](Self::name) with a caller-supplied timestamp
    pub fn name_at(
        &self,
        explicit_name: Option<&str>,
        page_title: Option<&str>,
        extension: MediaExtension,
        output_dir: &Path,
        timestamp: i64,
    ) -> DestinationName {
        let base_name = self.base_name(explicit_name, page_title, timestamp);
        let ext = extension.suffix();

        let mut path = output_dir.join(format!("{}_{}{}", base_name, timestamp, ext));
        let mut counter = 1u32;
        while path.exists() {
            path = output_dir.join(format!("{}_{}_{}{}", base_name, timestamp, counter, ext));
            counter += 1;
        }

        debug!("Destination for {:?}: {}", base_name, path.display());
        DestinationName {
            base_name,
            extension,
            path,
        }
    }

    fn base_name(
        &self,
        explicit_name: Option<&str>,
        page_title: Option<&str>,
        timestamp: i64,
    ) -> String {
        if let Some(name) = explicit_name.filter(|n| !n.is_empty()) {
            return format!("{}_{}", sanitize_filename(name), timestamp);
        }
        match page_title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title_base_name(title),
            None => format!("{}{}", self.fallback_prefix, timestamp),
        }
    }
}
