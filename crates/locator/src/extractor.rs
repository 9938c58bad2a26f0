use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_page_dom::{HostDocument, NodeId};
use tracing::debug;

use crate::strategies::TextStrategy;
use crate::types::LocatorCatalog;

/// Best-effort text payload for a content unit.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    catalog: Arc<LocatorCatalog>,
}

impl ContentExtractor {
    pub fn new(catalog: Arc<LocatorCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the first non-empty capture of the platform's strategy chain,
    /// or an empty string when the unit is absent, detached or textless.
    /// Never fails; callers decide whether empty is an error.
    pub fn extract(
        &self,
        doc: &dyn HostDocument,
        unit: Option<NodeId>,
        platform: PlatformVariant,
    ) -> String {
        let Some(unit) = unit.filter(|node| doc.is_connected(*node)) else {
            return String::new();
        };
        let Some(set) = self.catalog.for_platform(platform) else {
            return String::new();
        };
        let exclude = self.catalog.control_selector();
        for strategy in TextStrategy::fallback_chain(set) {
            if let Some(text) = strategy.capture(doc, unit, exclude) {
                debug!(strategy = %strategy.name(), %unit, chars = text.len(), "extracted text");
                return text;
            }
        }
        String::new()
    }
}
