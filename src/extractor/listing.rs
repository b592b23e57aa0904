//! Item links from a profile/listing page

use crate::extractor::models::ListingItem;
use scraper::{Html, Selector};
use tracing::debug;

/// Finds item-detail anchors and turns them into absolute URLs
pub struct ListingExtractor {
    origin: String,
    anchors: Option<Selector>,
}

impl ListingExtractor {
    /// `origin` is prefixed to every matching relative href, e.g.
    /// `https://www.douyin.com` + `/video/123`.
    pub fn new(origin: &str, item_path_prefix: &str) -> Self {
        let css = format!(r#"a[href^="{}"]"#, item_path_prefix.replace('"', "\\\""));
        let anchors = Selector::parse(&css).ok();
        if anchors.is_none() {
            debug!("Unusable item path prefix: {}", item_path_prefix);
        }
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            anchors,
        }
    }

    /// First `max_count` item links in document order.
    ///
    /// Never fails: malformed or empty markup simply yields no items.
    pub fn extract(&self, html: &str, max_count: usize) -> Vec<ListingItem> {
        let Some(anchors) = &self.anchors else {
            return Vec::new();
        };
        let document = Html::parse_document(html);

        let items: Vec<ListingItem> = document
            .select(anchors)
            .filter_map(|a| a.value().attr("href"))
            .take(max_count)
            .map(|href| ListingItem {
                detail_url: format!("{}{}", self.origin, href),
            })
            .collect();

        debug!("Found {} listing item(s)", items.len());
        items
    }
}
