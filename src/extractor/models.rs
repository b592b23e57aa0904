//! Data structures for rendered pages and media candidates

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Suffixes that mark a URL as an explicit audio file
pub const AUDIO_SUFFIXES: [&str; 4] = [".mp3", ".aac", ".m4a", ".wav"];

/// Snapshot of a page after client-side rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    pub html: String,
    pub title: Option<String>,
    pub current_url: String,
}

impl RenderedPage {
    /// Title reported by the session, else the document's `<title>` element
    pub fn display_title(&self) -> Option<String> {
        let reported = self.title.as_deref().filter(|t| !t.trim().is_empty());
        if let Some(title) = reported {
            return Some(title.to_string());
        }

        let selector = Selector::parse("title").ok()?;
        let document = Html::parse_document(&self.html);
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// A URL found in a page that may be the media source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub url: String,
    pub is_explicit_audio: bool,
}

impl MediaCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let is_explicit_audio = AUDIO_SUFFIXES.iter().any(|ext| url.ends_with(ext));
        Self {
            url,
            is_explicit_audio,
        }
    }
}

/// Candidates in discovery order, unique by URL (first seen wins)
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    items: Vec<MediaCandidate>,
    seen: HashSet<String>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `url` unless an identical URL is already present.
    /// Returns true when the URL was new.
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.items.push(MediaCandidate::new(url));
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaCandidate> {
        self.items.iter()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.url.as_str()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = CandidateList::new();
        for url in iter {
            list.push(url);
        }
        list
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a MediaCandidate;
    type IntoIter = std::slice::Iter<'a, MediaCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// File extension inferred from the selected URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaExtension {
    Mp3,
    Aac,
    M4a,
    Wav,
    Mp4,
}

impl MediaExtension {
    /// Match order matters: first literal suffix wins
    const ORDERED: [MediaExtension; 5] = [
        MediaExtension::Mp3,
        MediaExtension::Aac,
        MediaExtension::M4a,
        MediaExtension::Wav,
        MediaExtension::Mp4,
    ];

    /// Infer from the literal URL suffix; `.mp3` when nothing matches
    pub fn from_url(url: &str) -> Self {
        Self::ORDERED
            .into_iter()
            .find(|ext| url.ends_with(ext.suffix()))
            .unwrap_or(MediaExtension::Mp3)
    }

    /// Suffix including the leading dot
    pub fn suffix(&self) -> &'static str {
        match self {
            MediaExtension::Mp3 => ".mp3",
            MediaExtension::Aac => ".aac",
            MediaExtension::M4a => ".m4a",
            MediaExtension::Wav => ".wav",
            MediaExtension::Mp4 => ".mp4",
        }
    }

    pub fn as_str(&self) -> &'static str {
        &self.suffix()[1..]
    }
}

/// The candidate chosen for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub url: String,
    pub extension: MediaExtension,
}

/// Collision-free target for one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationName {
    pub base_name: String,
    pub extension: MediaExtension,
    pub path: PathBuf,
}

/// One item-detail link from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub detail_url: String,
}
