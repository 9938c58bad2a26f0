//! Control Factory.
//!
//! A control is a small detached subtree: a root carrying
//! [`CONTROL_ATTRIBUTE`], an icon, a loading indicator that starts hidden and
//! a status line. The factory only builds it; the scan engine decides where
//! and whether it goes, and must never ask twice for the same unit.

use std::sync::{Arc, Weak};

use feedreply_core_types::ControlId;
use feedreply_locator::CONTROL_ATTRIBUTE;
use feedreply_page_dom::{listener, DomError, EventKind, HostDocument, ListenerVerdict, NodeId};

pub const ROOT_CLASS: &str = "feedreply-control";
pub const HOVER_CLASS: &str = "feedreply-control--hover";
pub const SUCCESS_CLASS: &str = "feedreply-control--success";
pub const ERROR_CLASS: &str = "feedreply-control--error";

const ICON_GLYPH: &str = "✨";

/// Handles into one control subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    pub id: ControlId,
    pub root: NodeId,
    pub icon: NodeId,
    pub spinner: NodeId,
    pub status: NodeId,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ControlFactory;

impl ControlFactory {
    /// Builds a fresh, unattached control with hover feedback wired up.
    pub fn create(&self, doc: &Arc<dyn HostDocument>) -> Result<Control, DomError> {
        let id = ControlId::new();

        let root = doc.create_element("div");
        doc.set_attribute(root, CONTROL_ATTRIBUTE, id.short())?;
        doc.set_attribute(root, "class", ROOT_CLASS)?;
        doc.set_attribute(root, "role", "button")?;
        doc.set_attribute(root, "tabindex", "0")?;
        doc.set_attribute(root, "aria-label", "Generate reply")?;
        doc.set_attribute(root, "data-state", "idle")?;

        let icon = doc.create_element("span");
        doc.set_attribute(icon, "class", "feedreply-control__icon")?;
        doc.set_text(icon, ICON_GLYPH)?;

        let spinner = doc.create_element("span");
        doc.set_attribute(spinner, "class", "feedreply-control__spinner")?;
        doc.set_hidden(spinner, true)?;

        let status = doc.create_element("span");
        doc.set_attribute(status, "class", "feedreply-control__status")?;
        doc.set_attribute(status, "aria-live", "polite")?;

        for child in [icon, spinner, status] {
            doc.append_child(root, child)?;
        }
        wire_hover(doc, root);

        Ok(Control {
            id,
            root,
            icon,
            spinner,
            status,
        })
    }
}

fn wire_hover(doc: &Arc<dyn HostDocument>, root: NodeId) {
    for (kind, hovered) in [(EventKind::PointerEnter, true), (EventKind::PointerLeave, false)] {
        // The document owns its listeners; a strong handle here would leak it.
        let weak: Weak<dyn HostDocument> = Arc::downgrade(doc);
        doc.add_listener(
            root,
            kind,
            listener(move |ctx| {
                if let Some(doc) = weak.upgrade() {
                    if hovered {
                        doc.add_class(ctx.current, HOVER_CLASS)?;
                    } else {
                        doc.remove_class(ctx.current, HOVER_CLASS)?;
                    }
                }
                Ok(ListenerVerdict::Continue)
            }),
        );
    }
}

/// Cuts `message` to at most `max_chars` characters, ending in an ellipsis
/// when anything was dropped.
pub fn truncate_status(message: &str, max_chars: usize) -> String {
    let message = message.trim();
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(max_chars.saturating_sub(1)).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use feedreply_page_dom::{DomEvent, MemoryDocument};

    use super::*;

    #[test]
    fn builds_detached_subtree() {
        let doc: Arc<dyn HostDocument> =
            Arc::new(MemoryDocument::new("https://www.linkedin.com/feed/"));
        let control = ControlFactory.create(&doc).unwrap();

        assert!(!doc.is_connected(control.root));
        assert_eq!(
            doc.children(control.root),
            vec![control.icon, control.spinner, control.status]
        );
        assert_eq!(
            doc.attribute(control.root, CONTROL_ATTRIBUTE).as_deref(),
            Some(control.id.short())
        );
        assert_eq!(doc.visible_text(control.root, None), ICON_GLYPH);
    }

    #[test]
    fn hover_toggles_class_only() {
        let doc: Arc<dyn HostDocument> =
            Arc::new(MemoryDocument::new("https://www.linkedin.com/feed/"));
        let control = ControlFactory.create(&doc).unwrap();
        doc.append_child(doc.body(), control.root).unwrap();

        doc.dispatch(control.root, DomEvent::pointer_enter()).unwrap();
        assert!(doc.has_class(control.root, HOVER_CLASS));
        assert!(doc.has_class(control.root, ROOT_CLASS));
        doc.dispatch(control.root, DomEvent::pointer_leave()).unwrap();
        assert!(!doc.has_class(control.root, HOVER_CLASS));
    }

    #[test]
    fn every_control_is_distinct() {
        let doc: Arc<dyn HostDocument> = Arc::new(MemoryDocument::new("https://x.com/home"));
        let a = ControlFactory.create(&doc).unwrap();
        let b = ControlFactory.create(&doc).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.root, b.root);
    }

    #[test]
    fn status_truncation() {
        assert_eq!(truncate_status("  short  ", 10), "short");
        assert_eq!(truncate_status("exactly ten", 11), "exactly ten");
        assert_eq!(truncate_status("Error: server returned 500", 12), "Error: serv…");
        assert_eq!(truncate_status("a b c d e f", 4), "a b…");
        assert_eq!(truncate_status("✓✓✓✓✓", 3).chars().count(), 3);
    }
}
