use std::fmt;

use tokio::sync::broadcast;

use crate::errors::DomError;
use crate::events::{DispatchOutcome, DocumentSignal, DomEvent, EventKind, Listener};
use crate::selector::Selector;

/// Reference identity of a node in the host document. Two handles are the same
/// node exactly when the ids are equal; nodes are never copied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the engine needs from the host page.
///
/// Lookups never fail: a node that is gone simply matches nothing and has no
/// text. Writes report [`DomError`] so callers can decide whether a failure is
/// fatal for the current operation.
pub trait HostDocument: Send + Sync {
    /// Current page address; changes on in-app navigation.
    fn location(&self) -> String;

    fn body(&self) -> NodeId;

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in
    /// document order.
    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    fn query_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Whether the node is still attached under the document root.
    fn is_connected(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element children only.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Raw text of every descendant text node.
    fn text_content(&self, node: NodeId) -> String;

    /// Whitespace-collapsed text of rendered descendants, skipping hidden
    /// subtrees and anything matching `exclude`.
    fn visible_text(&self, node: NodeId, exclude: Option<&Selector>) -> String;

    fn rendered_height(&self, node: NodeId) -> f64;

    fn viewport_height(&self) -> f64;

    fn is_editable(&self, node: NodeId) -> bool;

    /// Creates a detached element.
    fn create_element(&self, tag: &str) -> NodeId;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError>;

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn add_class(&self, node: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let mut classes = self.attribute(node, "class").unwrap_or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self.set_attribute(node, "class", &classes)
    }

    fn remove_class(&self, node: NodeId, class: &str) -> Result<(), DomError> {
        let Some(classes) = self.attribute(node, "class") else {
            return Ok(());
        };
        let kept: Vec<&str> = classes.split_whitespace().filter(|c| *c != class).collect();
        self.set_attribute(node, "class", &kept.join(" "))
    }

    fn set_hidden(&self, node: NodeId, hidden: bool) -> Result<(), DomError> {
        if hidden {
            self.set_attribute(node, "hidden", "")
        } else {
            self.remove_attribute(node, "hidden")
        }
    }

    /// Replaces all children of `node` with a single text node.
    fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    fn focus(&self, node: NodeId) -> Result<(), DomError>;

    fn set_caret_to_end(&self, node: NodeId) -> Result<(), DomError>;

    fn add_listener(&self, node: NodeId, kind: EventKind, listener: Listener);

    /// Dispatches `event` at `target`, bubbling to the root, then runs the
    /// default action unless a listener prevented it.
    fn dispatch(&self, target: NodeId, event: DomEvent) -> Result<DispatchOutcome, DomError>;

    /// Structural, attribute and history notifications.
    fn subscribe(&self) -> broadcast::Receiver<DocumentSignal>;

    /// Blocking, user-facing notice.
    fn notify_user(&self, message: &str);
}
