//! Text capture strategies
//!
//! Applied in order within one content unit; the first non-empty capture
//! wins. [`TextStrategy::UnitText`] always closes the chain.

use feedreply_page_dom::{HostDocument, NodeId, Selector};
use tracing::debug;

use crate::types::LocatorSet;

#[derive(Debug, Clone)]
pub enum TextStrategy {
    /// Visible text of the first element matching the selector
    Element(Selector),

    /// Visible text of the whole unit
    UnitText,
}

impl TextStrategy {
    pub fn name(&self) -> String {
        match self {
            TextStrategy::Element(selector) => format!("element:{selector}"),
            TextStrategy::UnitText => "unit-text".to_string(),
        }
    }

    /// Ordered chain for a platform's locator set
    pub fn fallback_chain(set: &LocatorSet) -> Vec<TextStrategy> {
        set.text
            .iter()
            .cloned()
            .map(TextStrategy::Element)
            .chain(std::iter::once(TextStrategy::UnitText))
            .collect()
    }

    /// Captured text, trimmed; `None` when the strategy finds nothing.
    pub fn capture(
        &self,
        doc: &dyn HostDocument,
        unit: NodeId,
        exclude: &Selector,
    ) -> Option<String> {
        let text = match self {
            TextStrategy::Element(selector) => {
                let node = doc.query_first(unit, selector)?;
                doc.visible_text(node, Some(exclude))
            }
            TextStrategy::UnitText => doc.visible_text(unit, Some(exclude)),
        };
        let text = text.trim();
        if text.is_empty() {
            debug!(strategy = %self.name(), %unit, "strategy captured nothing");
            None
        } else {
            Some(text.to_string())
        }
    }
}
