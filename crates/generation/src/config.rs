use std::time::Duration;

use feedreply_core_types::PlatformVariant;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://api.feedreply.app";

/// Where requests go and how long they may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub professional_feed_path: String,
    pub microblog_path: String,

    /// Client-side timeout. Off by default: a hung call only ties up the
    /// control that issued it.
    pub request_timeout_secs: Option<u64>,

    pub user_agent: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            professional_feed_path: "/api/generate/linkedin".to_string(),
            microblog_path: "/api/generate/twitter".to_string(),
            request_timeout_secs: None,
            user_agent: concat!("feedreply/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Full endpoint for a platform. Unknown pages have no endpoint.
    pub fn endpoint(&self, platform: PlatformVariant) -> Result<Url, GenerationError> {
        let path = match platform {
            PlatformVariant::ProfessionalFeed => &self.professional_feed_path,
            PlatformVariant::Microblog => &self.microblog_path,
            PlatformVariant::Unknown => return Err(GenerationError::UnsupportedPlatform),
        };
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| GenerationError::InvalidEndpoint {
            endpoint: joined,
            reason: err.to_string(),
        })
    }
}
