//! Parsed CSS selectors.
//!
//! Locators are configuration data, so selectors are parsed once when the
//! configuration is loaded and matched many times afterwards. Parsing and
//! matching are scraper's; this wrapper only keeps the source text around for
//! logs and for hosts that want to hand it to `querySelectorAll`.

use std::fmt;
use std::str::FromStr;

use scraper::ElementRef;

use crate::errors::SelectorError;

#[derive(Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compiled: scraper::Selector,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let compiled = scraper::Selector::parse(trimmed).map_err(|kind| SelectorError::Invalid {
            source_text: trimmed.to_string(),
            reason: kind.to_string(),
        })?;
        Ok(Self {
            source: trimmed.to_string(),
            compiled,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.compiled.matches(element)
    }

    pub(crate) fn compiled(&self) -> &scraper::Selector {
        &self.compiled
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({:?})", self.source)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}
