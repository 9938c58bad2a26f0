//! Loading saved page snapshots into a [`MemoryDocument`].

use scraper::Html;
use tracing::debug;

use crate::memory::{MemoryDocument, Page};

impl MemoryDocument {
    /// Builds a document from serialized HTML. `<head>` and whitespace-only
    /// text are dropped. Layout is not computed, so heights come from
    /// `data-height` or inline styles.
    pub fn from_html(location: &str, html: &str) -> Self {
        let parsed = Html::parse_document(html);
        if !parsed.errors.is_empty() {
            debug!(location, errors = parsed.errors.len(), "snapshot parsed with recoverable errors");
        }
        let doc = MemoryDocument::with_page(Page::from_parsed(location, parsed));
        debug!(
            location,
            elements = doc.element_count(),
            "loaded page snapshot"
        );
        doc
    }
}
