use std::fmt;

use feedreply_core_types::PlatformVariant;
use feedreply_page_dom::NodeId;
use serde::{Deserialize, Serialize};

/// Change-detection model of an input surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Plain editable region; the page reads it back on `input`/`change`.
    NativeEditable,
    /// Composer whose content is owned by a client-side framework.
    FrameworkComposer,
}

impl SurfaceKind {
    pub fn for_platform(platform: PlatformVariant) -> Option<Self> {
        match platform {
            PlatformVariant::ProfessionalFeed => Some(SurfaceKind::NativeEditable),
            PlatformVariant::Microblog => Some(SurfaceKind::FrameworkComposer),
            PlatformVariant::Unknown => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::NativeEditable => "native_editable",
            SurfaceKind::FrameworkComposer => "framework_composer",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the text actually got in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionMethod {
    Assigned,
    Pasted,
    CharacterFallback,
}

impl InjectionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            InjectionMethod::Assigned => "assigned",
            InjectionMethod::Pasted => "pasted",
            InjectionMethod::CharacterFallback => "character_fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionReport {
    pub surface: NodeId,
    pub kind: SurfaceKind,
    pub method: InjectionMethod,
    pub chars: usize,
}
