//! Host document access for the annotation engine.
//!
//! The engine only ever sees a [`HostDocument`]: structural queries, a few
//! writes (node insertion, attributes, text), synthetic event dispatch and a
//! stream of [`DocumentSignal`]s standing in for a mutation observer. All of
//! it is synchronous; suspension only happens around network calls and timers.
//!
//! [`MemoryDocument`] is the scraper-backed implementation used by tests and by
//! the CLI when replaying a saved page snapshot.

pub mod document;
pub mod errors;
pub mod events;
pub mod memory;
pub mod selector;
pub mod snapshot;

pub use document::{HostDocument, NodeId};
pub use errors::{DomError, SelectorError};
pub use events::{
    listener, DispatchOutcome, DocumentSignal, DomEvent, EventContext, EventKind, Listener,
    ListenerVerdict,
};
pub use memory::MemoryDocument;
pub use selector::Selector;
