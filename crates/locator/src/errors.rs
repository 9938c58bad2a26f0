//! Configuration-time errors. Nothing here is raised while scanning.

use feedreply_page_dom::SelectorError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// A selector in the configuration did not parse
    #[error("invalid {field} selector '{selector}': {source}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        source: SelectorError,
    },

    /// The detail-view address pattern is not a valid regex
    #[error("invalid detail url pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A required locator list is empty
    #[error("locator list '{0}' must not be empty")]
    EmptyList(&'static str),

    /// Ratio or threshold outside its domain
    #[error("invalid threshold {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}
