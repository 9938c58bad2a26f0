use std::sync::Arc;

use crate::document::NodeId;
use crate::errors::DomError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    Click,
    PointerEnter,
    PointerLeave,
    Input,
    Change,
    Paste,
    /// Single insertion, the equivalent of an `insertText` input command.
    InsertText,
}

/// A dispatched event. `data` carries clipboard or inserted text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub data: Option<String>,
    pub bubbles: bool,
}

impl DomEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            data: None,
            bubbles: true,
        }
    }

    pub fn click() -> Self {
        Self::new(EventKind::Click)
    }

    pub fn input() -> Self {
        Self::new(EventKind::Input)
    }

    pub fn change() -> Self {
        Self::new(EventKind::Change)
    }

    pub fn paste(text: &str) -> Self {
        Self {
            data: Some(text.to_string()),
            ..Self::new(EventKind::Paste)
        }
    }

    pub fn insert_text(text: &str) -> Self {
        Self {
            data: Some(text.to_string()),
            ..Self::new(EventKind::InsertText)
        }
    }

    pub fn pointer_enter() -> Self {
        Self {
            bubbles: false,
            ..Self::new(EventKind::PointerEnter)
        }
    }

    pub fn pointer_leave() -> Self {
        Self {
            bubbles: false,
            ..Self::new(EventKind::PointerLeave)
        }
    }
}

/// What a listener sees while an event travels up the tree.
#[derive(Clone, Copy, Debug)]
pub struct EventContext<'a> {
    pub event: &'a DomEvent,
    pub target: NodeId,
    pub current: NodeId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListenerVerdict {
    Continue,
    PreventDefault,
}

pub type Listener =
    Arc<dyn Fn(&EventContext<'_>) -> Result<ListenerVerdict, DomError> + Send + Sync>;

/// Wraps a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&EventContext<'_>) -> Result<ListenerVerdict, DomError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchOutcome {
    /// At least one listener ran.
    pub handled: bool,
    pub default_prevented: bool,
}

/// Mutation-observer style notifications. Only changes to connected nodes are
/// reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentSignal {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attributes {
        target: NodeId,
        name: String,
    },
    CharacterData {
        target: NodeId,
    },
    /// Back/forward navigation.
    History {
        location: String,
    },
}

impl DocumentSignal {
    /// Node additions or removals, the only changes that can surface new units.
    pub fn is_structural(&self) -> bool {
        matches!(self, DocumentSignal::ChildList { .. })
    }
}
