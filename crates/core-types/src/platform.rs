use std::fmt;

use url::Url;

/// Host page classification. Derived once from the page address and never
/// re-derived on in-app navigation.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PlatformVariant {
    ProfessionalFeed,
    Microblog,
    Unknown,
}

const PROFESSIONAL_HOSTS: &[&str] = &["linkedin.com"];
const MICROBLOG_HOSTS: &[&str] = &["twitter.com", "x.com"];

impl PlatformVariant {
    pub fn name(&self) -> &'static str {
        match self {
            PlatformVariant::ProfessionalFeed => "professional_feed",
            PlatformVariant::Microblog => "microblog",
            PlatformVariant::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PlatformVariant::Unknown)
    }
}

impl fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a page address. Total: anything unparsable or on an unlisted
/// host is `Unknown`.
pub fn detect_platform(address: &str) -> PlatformVariant {
    let Ok(url) = Url::parse(address.trim()) else {
        return PlatformVariant::Unknown;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return PlatformVariant::Unknown;
    }
    let Some(host) = url.host_str() else {
        return PlatformVariant::Unknown;
    };
    let host = host.to_ascii_lowercase();

    if host_matches(&host, PROFESSIONAL_HOSTS) {
        PlatformVariant::ProfessionalFeed
    } else if host_matches(&host, MICROBLOG_HOSTS) {
        PlatformVariant::Microblog
    } else {
        PlatformVariant::Unknown
    }
}

fn host_matches(host: &str, known: &[&str]) -> bool {
    known.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
