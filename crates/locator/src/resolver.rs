//! Unit discovery and placement lookups
//!
//! Every function here treats "no match" as a normal answer.

use std::collections::HashSet;

use feedreply_page_dom::{HostDocument, NodeId};
use tracing::debug;

use crate::types::{InputScope, LocatorSet};

/// Where a control is inserted within its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The unit's interaction bar
    Actions(NodeId),
    /// The unit's last element child
    LastChild(NodeId),
    /// The unit itself
    Unit(NodeId),
}

impl Anchor {
    pub fn node(&self) -> NodeId {
        match self {
            Anchor::Actions(node) | Anchor::LastChild(node) | Anchor::Unit(node) => *node,
        }
    }
}

/// Candidate units in locator priority order, each node at most once.
pub fn find_units(doc: &dyn HostDocument, set: &LocatorSet) -> Vec<NodeId> {
    let body = doc.body();
    let mut seen = HashSet::new();
    let mut units = Vec::new();
    for selector in &set.units {
        for node in doc.query_all(body, selector) {
            if seen.insert(node) {
                units.push(node);
            }
        }
    }
    units
}

/// Single-item view test. Sets without a detail-view classifier are always
/// "in detail view", i.e. never gated.
pub fn is_detail_view(doc: &dyn HostDocument, set: &LocatorSet) -> bool {
    let Some(detail) = &set.detail_view else {
        return true;
    };
    let location = doc.location();
    if detail.url_pattern.is_match(&location) {
        return true;
    }
    let units = doc.query_all(doc.body(), &detail.unit);
    let [only] = units.as_slice() else {
        return false;
    };
    let threshold = doc.viewport_height() * detail.height_ratio;
    let height = doc.rendered_height(*only);
    debug!(%location, height, threshold, "detail view height check");
    height > threshold
}

pub fn resolve_anchor(doc: &dyn HostDocument, unit: NodeId, set: &LocatorSet) -> Anchor {
    if let Some(actions) = set
        .actions
        .iter()
        .find_map(|selector| doc.query_first(unit, selector))
    {
        return Anchor::Actions(actions);
    }
    match doc.children(unit).last() {
        Some(last) => Anchor::LastChild(*last),
        None => Anchor::Unit(unit),
    }
}

/// The editable surface a reply should be written into.
pub fn resolve_input(
    doc: &dyn HostDocument,
    unit: Option<NodeId>,
    set: &LocatorSet,
) -> Option<NodeId> {
    let body = doc.body();
    let editable = |node: &NodeId| doc.is_editable(*node);
    match set.input_scope {
        InputScope::UnitThenDocument => {
            let in_unit = unit.filter(|u| doc.is_connected(*u)).and_then(|u| {
                set.inputs
                    .iter()
                    .find_map(|selector| doc.query_all(u, selector).into_iter().find(editable))
            });
            in_unit.or_else(|| {
                set.inputs
                    .iter()
                    .find_map(|selector| doc.query_all(body, selector).into_iter().find(editable))
            })
        }
        InputScope::LatestInDocument => set.inputs.iter().find_map(|selector| {
            doc.query_all(body, selector)
                .into_iter()
                .filter(editable)
                .last()
        }),
    }
}
