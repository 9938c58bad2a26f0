//! The annotation engine.
//!
//! [`Annotator`] finds content units on a supported page, attaches one
//! reply control to each and keeps doing so as the page changes. Each
//! control runs its own extract, generate and inject cycle through a
//! [`ReplyController`].

pub mod config;
pub mod control;
pub mod controller;
pub mod debounce;
pub mod engine;
pub mod errors;
pub mod events;

mod context;
mod scan;
mod watcher;

pub use config::AnnotatorConfig;
pub use control::{truncate_status, Control, ControlFactory};
pub use controller::{ReplyController, GENERATING_STATUS, SUCCESS_STATUS};
pub use debounce::Debouncer;
pub use engine::Annotator;
pub use errors::AnnotatorError;
pub use events::{EngineEvent, ScanReport};
