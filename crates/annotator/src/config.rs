use std::time::Duration;

use feedreply_generation::GenerationConfig;
use feedreply_locator::CatalogOverrides;
use serde::{Deserialize, Serialize};

/// Engine tuning. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Quiet period a mutation burst must settle for before one scan runs.
    pub debounce_ms: u64,

    /// Delay between a detected navigation and the rescan that follows it.
    pub navigation_settle_ms: u64,

    pub success_display_ms: u64,
    pub error_display_ms: u64,

    /// Longer status messages are cut and end in an ellipsis.
    pub status_max_chars: usize,

    pub generation: GenerationConfig,

    pub locators: CatalogOverrides,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            navigation_settle_ms: 500,
            success_display_ms: 2_000,
            error_display_ms: 3_000,
            status_max_chars: 80,
            generation: GenerationConfig::default(),
            locators: CatalogOverrides::default(),
        }
    }
}

impl AnnotatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}
