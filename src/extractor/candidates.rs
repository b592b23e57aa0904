//! Media candidate extraction from rendered HTML
//!
//! Page markup on the platform changes often and parts of it are escaped or
//! embedded in script payloads, so no single pattern is reliable. Several
//! independent strategies scan the same text in a fixed order and their hits
//! are merged into one de-duplicated [`CandidateList`]. Ranking happens later,
//! in the selector.

use crate::extractor::models::CandidateList;
use crate::utils::error::DyloaderError;
use anyhow::Result;
use regex::Regex;
use tracing::debug;

/// JSON field carrying the media address in page data
pub const PLAY_ADDR_FIELD: &str = "playAddr";

/// A single way of finding candidate URLs in page text
pub trait CandidateStrategy: Send + Sync {
    fn id(&self) -> &'static str;

    /// Push every URL found in `html` into `out`
    fn scan(&self, html: &str, out: &mut CandidateList);
}

/// `"<field>":"<value>"` occurrences, escape-decoded, http(s) only
pub struct StructuredFieldStrategy {
    pattern: Regex,
}

impl StructuredFieldStrategy {
    pub fn new(field: &str) -> Self {
        let pattern = Regex::new(&format!(r#""{}":"([^"]+)""#, regex::escape(field)))
            .expect("structured field pattern is valid");
        Self { pattern }
    }
}

impl CandidateStrategy for StructuredFieldStrategy {
    fn id(&self) -> &'static str {
        "structured-field"
    }

    fn scan(&self, html: &str, out: &mut CandidateList) {
        for caps in self.pattern.captures_iter(html) {
            let decoded = decode_escapes(&caps[1]);
            if has_url_scheme(&decoded) {
                out.push(decoded);
            }
        }
    }
}

/// Scheme-prefixed substrings ending in a known media suffix
pub struct BareUrlStrategy {
    pattern: Regex,
}

impl BareUrlStrategy {
    pub fn new() -> Self {
        let pattern = Regex::new(r#"https?://[^\s"'<>]+?\.(?:mp4|mp3|aac|m4a|wav)"#)
            .expect("bare url pattern is valid");
        Self { pattern }
    }
}

impl Default for BareUrlStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateStrategy for BareUrlStrategy {
    fn id(&self) -> &'static str {
        "bare-url"
    }

    fn scan(&self, html: &str, out: &mut CandidateList) {
        for m in self.pattern.find_iter(html) {
            out.push(m.as_str());
        }
    }
}

/// Structured-field scan repeated inside each `<script>` block on its own
pub struct EmbeddedScriptStrategy {
    block: Regex,
    field: StructuredFieldStrategy,
}

impl EmbeddedScriptStrategy {
    pub fn new(field: &str) -> Self {
        let block =
            Regex::new(r"(?s)<script[^>]*>(.*?)</script>").expect("script block pattern is valid");
        Self {
            block,
            field: StructuredFieldStrategy::new(field),
        }
    }
}

impl CandidateStrategy for EmbeddedScriptStrategy {
    fn id(&self) -> &'static str {
        "embedded-script"
    }

    fn scan(&self, html: &str, out: &mut CandidateList) {
        for caps in self.block.captures_iter(html) {
            self.field.scan(&caps[1], out);
        }
    }
}

/// Runs every strategy in priority order and merges the hits
pub struct CandidateExtractor {
    strategies: Vec<Box<dyn CandidateStrategy>>,
}

impl CandidateExtractor {
    /// Structured field, then bare URL, then embedded script
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(StructuredFieldStrategy::new(PLAY_ADDR_FIELD)),
            Box::new(BareUrlStrategy::new()),
            Box::new(EmbeddedScriptStrategy::new(PLAY_ADDR_FIELD)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn CandidateStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract candidates; fails with `NoCandidates` when nothing matched
    pub fn extract(&self, html: &str) -> Result<CandidateList> {
        let mut candidates = CandidateList::new();
        for strategy in &self.strategies {
            let before = candidates.len();
            strategy.scan(html, &mut candidates);
            debug!(
                "Strategy {} added {} candidate(s)",
                strategy.id(),
                candidates.len() - before
            );
        }

        if candidates.is_empty() {
            return Err(DyloaderError::NoCandidates.into());
        }
        Ok(candidates)
    }
}

impl Default for CandidateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn has_url_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Decode backslash escapes in a raw JSON string value.
///
/// Well-formed values go through serde_json. Values cut short by the capture
/// (a trailing `\`, a broken `\u` sequence) are decoded leniently, keeping any
/// sequence that cannot be interpreted as-is.
pub fn decode_escapes(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    match serde_json::from_str::<String>(&format!("\"{}\"", raw)) {
        Ok(decoded) => decoded,
        Err(_) => decode_escapes_lenient(raw),
    }
}

fn decode_escapes_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('/') => push_and_skip(&mut out, &mut chars, '/'),
            Some('\\') => push_and_skip(&mut out, &mut chars, '\\'),
            Some('"') => push_and_skip(&mut out, &mut chars, '"'),
            Some('n') => push_and_skip(&mut out, &mut chars, '\n'),
            Some('t') => push_and_skip(&mut out, &mut chars, '\t'),
            Some('r') => push_and_skip(&mut out, &mut chars, '\r'),
            Some('b') => push_and_skip(&mut out, &mut chars, '\u{8}'),
            Some('f') => push_and_skip(&mut out, &mut chars, '\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().skip(1).take(4).collect();
                let well_formed = hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit());
                match u32::from_str_radix(&hex, 16).ok().filter(|_| well_formed) {
                    Some(code) => {
                        for _ in 0..5 {
                            chars.next();
                        }
                        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

fn push_and_skip(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    decoded: char,
) {
    chars.next();
    out.push(decoded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escaped_play_addr() {
        let html = r#"<div>{"playAddr":"https:\/\/cdn.example.com\/a.mp3"}</div>"#;
        let candidates = CandidateExtractor::new().extract(html).unwrap();
        assert_eq!(candidates.urls(), vec!["https://cdn.example.com/a.mp3"]);
    }

    #[test]
    fn test_unicode_escapes_decoded() {
        let html = r#""playAddr":"https:\u002F\u002Fcdn.example.com\u002Fv.mp4""#;
        let candidates = CandidateExtractor::new().extract(html).unwrap();
        assert_eq!(candidates.urls(), vec!["https://cdn.example.com/v.mp4"]);
    }

    #[test]
    fn test_non_http_field_values_ignored() {
        let html = r#""playAddr":"\/\/cdn.example.com\/a.mp3" "playAddr":"blob:xyz""#;
        let err = CandidateExtractor::new().extract(html).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DyloaderError>(),
            Some(DyloaderError::NoCandidates)
        ));
    }

    #[test]
    fn test_bare_urls_stop_at_first_media_suffix() {
        let html = r#"<video src="https://v.example.com/clip.mp4?sig=abc"></video>
            <a href='http://a.example.com/song.m4a'>x</a>"#;
        let candidates = CandidateExtractor::new().extract(html).unwrap();
        assert_eq!(
            candidates.urls(),
            vec![
                "https://v.example.com/clip.mp4",
                "http://a.example.com/song.m4a"
            ]
        );
    }

    #[test]
    fn test_strategies_merge_in_discovery_order() {
        let html = r#"<p>https://b.example.com/x.mp4</p>
            <script>window.d = {"playAddr":"https://a.example.com/stream"};</script>"#;
        let candidates = CandidateExtractor::new().extract(html).unwrap();
        // structured field runs first even though the bare URL is earlier in the text
        assert_eq!(
            candidates.urls(),
            vec!["https://a.example.com/stream", "https://b.example.com/x.mp4"]
        );
    }

    #[test]
    fn test_script_strategy_alone() {
        let strategy = EmbeddedScriptStrategy::new(PLAY_ADDR_FIELD);
        let mut out = CandidateList::new();
        strategy.scan(
            r#"<script type="application/json">{"playAddr":"https://s.example.com/1"}</script>
               {"playAddr":"https://outside.example.com/2"}"#,
            &mut out,
        );
        assert_eq!(out.urls(), vec!["https://s.example.com/1"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(CandidateExtractor::new().extract("").is_err());
    }

    #[test]
    fn test_lenient_decode_keeps_unknown_sequences() {
        assert_eq!(decode_escapes(r"https:\/\/a\/b\"), r"https://a/b\");
        assert_eq!(decode_escapes(r"a\qb"), r"a\qb");
        assert_eq!(decode_escapes(r"x\u00"), r"x\u00");
        assert_eq!(decode_escapes(r"a\u+041b\"), r"a\u+041b\");
        assert_eq!(decode_escapes(r"a\u0041b\"), r"aAb\");
        assert_eq!(decode_escapes(r"A\/"), "A/");
    }

    proptest! {
        #[test]
        fn prop_repeated_match_appears_once(path in "[a-z0-9]{1,12}", repeats in 1usize..6) {
            let raw = format!(r#""playAddr":"https:\/\/cdn.example.com\/{}.mp3""#, path);
            let html = raw.repeat(repeats);
            let candidates = CandidateExtractor::new().extract(&html).unwrap();
            let expected = format!("https://cdn.example.com/{}.mp3", path);
            let hits = candidates.iter().filter(|c| c.url == expected).count();
            prop_assert_eq!(hits, 1);
        }
    }
}
