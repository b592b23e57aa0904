//! Candidate ranking

use crate::extractor::models::{CandidateList, MediaCandidate, MediaExtension, SelectionResult};
use tracing::debug;

/// Pick the download target.
///
/// Explicit audio URLs (tier A) beat everything else (tier B); inside a tier
/// the earliest discovered candidate wins. Returns `None` only for an empty
/// list, which the extractor never produces.
pub fn select(candidates: &CandidateList) -> Option<SelectionResult> {
    let chosen: &MediaCandidate = candidates
        .iter()
        .find(|c| c.is_explicit_audio)
        .or_else(|| candidates.iter().next())?;

    let extension = MediaExtension::from_url(&chosen.url);
    debug!(
        "Selected {} (explicit audio: {}, ext: {})",
        chosen.url,
        chosen.is_explicit_audio,
        extension.as_str()
    );

    Some(SelectionResult {
        url: chosen.url.clone(),
        extension,
    })
}
