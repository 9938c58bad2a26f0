use feedreply_page_dom::{DomEvent, HostDocument, NodeId};
use tracing::{debug, warn};

use crate::errors::InjectionError;
use crate::model::InjectionMethod;

/// One way of getting text into an input surface.
pub trait InjectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Writes `text` into `surface`, which the caller has already resolved.
    fn inject_into(
        &self,
        doc: &dyn HostDocument,
        surface: NodeId,
        text: &str,
    ) -> Result<InjectionMethod, InjectionError>;
}

/// Focus, assign, then notify so the page's own state layer picks it up.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectAssignment;

impl InjectionStrategy for DirectAssignment {
    fn name(&self) -> &'static str {
        "direct_assignment"
    }

    fn inject_into(
        &self,
        doc: &dyn HostDocument,
        surface: NodeId,
        text: &str,
    ) -> Result<InjectionMethod, InjectionError> {
        ensure_connected(doc, surface)?;
        doc.focus(surface)?;
        doc.set_text(surface, text)?;
        doc.dispatch(surface, DomEvent::input())?;
        doc.dispatch(surface, DomEvent::change())?;
        Ok(InjectionMethod::Assigned)
    }
}

/// Paste-style event carrying the text, for composers that discard direct
/// writes on their next reconciliation. When the paste does not show up in
/// the surface, or a page listener throws while handling it, the text is sent
/// again one character at a time as insertion events.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticPaste;

impl SyntheticPaste {
    fn insert_characters(
        &self,
        doc: &dyn HostDocument,
        surface: NodeId,
        text: &str,
    ) -> Result<(), InjectionError> {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            doc.dispatch(surface, DomEvent::insert_text(ch.encode_utf8(&mut buf)))?;
        }
        Ok(())
    }
}

impl InjectionStrategy for SyntheticPaste {
    fn name(&self) -> &'static str {
        "synthetic_paste"
    }

    fn inject_into(
        &self,
        doc: &dyn HostDocument,
        surface: NodeId,
        text: &str,
    ) -> Result<InjectionMethod, InjectionError> {
        ensure_connected(doc, surface)?;
        doc.focus(surface)?;
        let before = doc.text_content(surface);

        let taken = match doc.dispatch(surface, DomEvent::paste(text)) {
            Ok(outcome) => {
                // Composers re-render line breaks as blocks, so compare
                // collapsed whitespace rather than raw text.
                let after = collapse_whitespace(&doc.text_content(surface));
                let changed = after != collapse_whitespace(&before);
                let landed = changed && after.contains(&collapse_whitespace(text));
                let taken = outcome.default_prevented || (outcome.handled && changed) || landed;
                if !taken {
                    debug!(%surface, handled = outcome.handled, "paste not taken up");
                }
                taken
            }
            Err(err) => {
                warn!(%surface, error = %err, "paste handler failed");
                false
            }
        };

        let method = if taken {
            InjectionMethod::Pasted
        } else {
            self.insert_characters(doc, surface, text)?;
            InjectionMethod::CharacterFallback
        };
        doc.set_caret_to_end(surface)?;
        Ok(method)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ensure_connected(doc: &dyn HostDocument, surface: NodeId) -> Result<(), InjectionError> {
    if doc.is_connected(surface) {
        Ok(())
    } else {
        Err(InjectionError::Detached(surface))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use feedreply_page_dom::{listener, EventKind, ListenerVerdict, MemoryDocument};

    use super::*;

    fn composer(doc: &MemoryDocument) -> NodeId {
        doc.add_element(
            doc.body(),
            "div",
            &[("role", "textbox"), ("contenteditable", "true")],
        )
        .unwrap()
    }

    #[test]
    fn direct_assignment_notifies_page() {
        let doc = Arc::new(MemoryDocument::new("https://www.linkedin.com/feed/"));
        let surface = composer(&doc);
        doc.add_text(surface, "old draft").unwrap();

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for kind in [EventKind::Input, EventKind::Change] {
            let seen = seen.clone();
            let page = doc.clone();
            doc.add_listener(
                surface,
                kind,
                listener(move |ctx| {
                    seen.lock()
                        .push((ctx.event.kind, page.text_content(ctx.target)));
                    Ok(ListenerVerdict::Continue)
                }),
            );
        }

        let method = DirectAssignment
            .inject_into(&*doc, surface, "Totally agree")
            .unwrap();
        assert_eq!(method, InjectionMethod::Assigned);
        assert_eq!(doc.text_content(surface), "Totally agree");
        assert_eq!(doc.focused(), Some(surface));
        assert_eq!(
            *seen.lock(),
            vec![
                (EventKind::Input, "Totally agree".to_string()),
                (EventKind::Change, "Totally agree".to_string()),
            ]
        );
    }

    #[test]
    fn unhandled_paste_falls_back_to_characters() {
        let doc = MemoryDocument::new("https://x.com/a/status/1");
        let surface = composer(&doc);

        let method = SyntheticPaste
            .inject_into(&doc, surface, "ship it 🚀")
            .unwrap();
        assert_eq!(method, InjectionMethod::CharacterFallback);
        assert_eq!(doc.text_content(surface), "ship it 🚀");
        assert_eq!(doc.caret(), Some((surface, "ship it 🚀".chars().count())));
    }

    #[test]
    fn whitespace_is_collapsed_for_comparison() {
        assert_eq!(
            collapse_whitespace("  Great thread.\nSaving\tthis one. "),
            "Great thread. Saving this one."
        );
        assert_eq!(collapse_whitespace("\n\n"), "");
    }

    #[test]
    fn detached_surface_is_reported() {
        let doc = MemoryDocument::new("https://x.com/a/status/1");
        let surface = doc.create_element("div");
        assert!(matches!(
            SyntheticPaste.inject_into(&doc, surface, "hi"),
            Err(InjectionError::Detached(node)) if node == surface
        ));
        assert!(matches!(
            DirectAssignment.inject_into(&doc, surface, "hi"),
            Err(InjectionError::Detached(_))
        ));
    }
}
