//! Injection Writer.
//!
//! Generated text reaches the host page through one of two techniques,
//! picked by the surface the platform exposes:
//!
//! - [`DirectAssignment`] for native editable regions whose owner listens for
//!   ordinary `input`/`change` notifications.
//! - [`SyntheticPaste`] for framework-controlled composers that discard direct
//!   writes. It falls back to per-character insertion when the paste is not
//!   taken up.
//!
//! The second technique depends on how the host framework reconciles its
//! composer state and is expected to need updates when that changes. Both sit
//! behind [`InjectionStrategy`] so either can be swapped out in isolation.

pub mod errors;
pub mod model;
pub mod strategy;
pub mod writer;

pub use errors::InjectionError;
pub use model::{InjectionMethod, InjectionReport, SurfaceKind};
pub use strategy::{DirectAssignment, InjectionStrategy, SyntheticPaste};
pub use writer::InjectionWriter;
