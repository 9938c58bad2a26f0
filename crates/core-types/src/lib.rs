//! Shared primitives for the FeedReply annotation engine.
//!
//! Everything here is plain data: the platform classification, the per-control
//! state enumeration, the generation request/result shapes and the error
//! taxonomy every other crate converts into.

use std::fmt;

use uuid::Uuid;

pub mod errors;
pub mod model;
pub mod platform;

pub use errors::{AuthFailure, ReplyError, UsageProblem};
pub use model::{ControlState, GenerationRequest, GenerationResult, Tone, Usage};
pub use platform::{detect_platform, PlatformVariant};

/// Identity of one injected control. Stable for the control's lifetime.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ControlId(pub String);

impl ControlId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Short form used in status attributes and log lines.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl Default for ControlId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
