//! Locators for the two supported host pages.
//!
//! Host markup is an implicit contract with a system we do not control, so
//! every selector lives in a versioned [`LocatorSet`] rather than in control
//! flow. Lookups degrade to "nothing found"; they never fail at scan time.
//!
//! - [`LocatorCatalog`]: built-in sets per platform plus configuration overrides
//! - [`ContentExtractor`]: ordered text strategies with a whole-unit fallback
//! - [`resolver`]: unit discovery, control anchors, input surfaces, detail view

pub mod defaults;
pub mod errors;
pub mod extractor;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::LocatorError;
pub use extractor::ContentExtractor;
pub use resolver::{find_units, is_detail_view, resolve_anchor, resolve_input, Anchor};
pub use strategies::TextStrategy;
pub use types::{
    CatalogOverrides, DetailViewSpec, InputScope, LocatorCatalog, LocatorOverride, LocatorSet,
    LocatorSetSpec, CONTROL_ATTRIBUTE,
};
