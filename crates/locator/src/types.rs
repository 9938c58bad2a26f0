//! Locator configuration data

use std::collections::HashMap;

use feedreply_core_types::PlatformVariant;
use feedreply_page_dom::Selector;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;
use crate::errors::LocatorError;

/// Attribute carried by the root of every injected control.
pub const CONTROL_ATTRIBUTE: &str = "data-feedreply-control";

/// Where the reply input is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputScope {
    /// Inside the content unit first, then the first match in the document.
    UnitThenDocument,
    /// The most recently rendered match in the whole document.
    LatestInDocument,
}

/// Single-item page classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailViewSpec {
    /// Regex matched against the page address.
    pub url_pattern: String,

    /// Top-level content element counted by the height heuristic.
    pub unit: String,

    /// Fraction of the viewport a lone unit must exceed.
    pub height_ratio: f64,
}

/// Serializable form of a [`LocatorSet`]; selectors as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorSetSpec {
    /// Content units, in priority order
    pub units: Vec<String>,

    /// Text-bearing elements inside a unit, in priority order
    pub text: Vec<String>,

    /// Interaction bars where the control is placed
    pub actions: Vec<String>,

    /// Reply/comment input surfaces
    pub inputs: Vec<String>,

    pub input_scope: InputScope,

    /// Units shorter than this (px) are nested fragments, not posts
    pub min_unit_height: Option<f64>,

    /// Units with less visible text than this are not content cards
    pub min_text_chars: Option<usize>,

    /// When set, scanning only happens in detail view
    pub detail_view: Option<DetailViewSpec>,
}

/// Partial override of a [`LocatorSetSpec`], as found in configuration files.
///
/// The optional limits take two levels: an absent key keeps the built-in
/// value, an explicit `null` switches the limit off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorOverride {
    pub units: Option<Vec<String>>,
    pub text: Option<Vec<String>>,
    pub actions: Option<Vec<String>>,
    pub inputs: Option<Vec<String>>,
    pub input_scope: Option<InputScope>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_unit_height: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_text_chars: Option<Option<usize>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_view: Option<Option<DetailViewSpec>>,
}

/// Marks a key that appeared in the input, `null` included.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl LocatorOverride {
    pub fn apply(self, mut base: LocatorSetSpec) -> LocatorSetSpec {
        if let Some(units) = self.units {
            base.units = units;
        }
        if let Some(text) = self.text {
            base.text = text;
        }
        if let Some(actions) = self.actions {
            base.actions = actions;
        }
        if let Some(inputs) = self.inputs {
            base.inputs = inputs;
        }
        if let Some(scope) = self.input_scope {
            base.input_scope = scope;
        }
        if let Some(height) = self.min_unit_height {
            base.min_unit_height = height;
        }
        if let Some(chars) = self.min_text_chars {
            base.min_text_chars = chars;
        }
        if let Some(detail_view) = self.detail_view {
            base.detail_view = detail_view;
        }
        base
    }
}

/// Per-platform overrides keyed the way configuration files spell them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOverrides {
    pub professional_feed: Option<LocatorOverride>,
    pub microblog: Option<LocatorOverride>,
}

/// Compiled detail-view classifier
#[derive(Debug, Clone)]
pub struct DetailView {
    pub url_pattern: Regex,
    pub unit: Selector,
    pub height_ratio: f64,
}

/// Compiled locators for one platform
#[derive(Debug, Clone)]
pub struct LocatorSet {
    pub units: Vec<Selector>,
    pub text: Vec<Selector>,
    pub actions: Vec<Selector>,
    pub inputs: Vec<Selector>,
    pub input_scope: InputScope,
    pub min_unit_height: Option<f64>,
    pub min_text_chars: Option<usize>,
    pub detail_view: Option<DetailView>,
}

impl LocatorSet {
    pub fn compile(spec: &LocatorSetSpec) -> Result<Self, LocatorError> {
        if spec.units.is_empty() {
            return Err(LocatorError::EmptyList("units"));
        }
        if spec.inputs.is_empty() {
            return Err(LocatorError::EmptyList("inputs"));
        }
        if let Some(height) = spec.min_unit_height {
            if !height.is_finite() || height < 0.0 {
                return Err(LocatorError::InvalidThreshold {
                    field: "min_unit_height",
                    value: height,
                });
            }
        }

        let detail_view = match &spec.detail_view {
            Some(detail) => {
                if !(0.0..=1.0).contains(&detail.height_ratio) {
                    return Err(LocatorError::InvalidThreshold {
                        field: "height_ratio",
                        value: detail.height_ratio,
                    });
                }
                let url_pattern =
                    Regex::new(&detail.url_pattern).map_err(|err| LocatorError::InvalidPattern {
                        pattern: detail.url_pattern.clone(),
                        reason: err.to_string(),
                    })?;
                Some(DetailView {
                    url_pattern,
                    unit: compile_one("detail_view.unit", &detail.unit)?,
                    height_ratio: detail.height_ratio,
                })
            }
            None => None,
        };

        Ok(Self {
            units: compile_list("units", &spec.units)?,
            text: compile_list("text", &spec.text)?,
            actions: compile_list("actions", &spec.actions)?,
            inputs: compile_list("inputs", &spec.inputs)?,
            input_scope: spec.input_scope,
            min_unit_height: spec.min_unit_height,
            min_text_chars: spec.min_text_chars,
            detail_view,
        })
    }
}

fn compile_one(field: &'static str, raw: &str) -> Result<Selector, LocatorError> {
    Selector::parse(raw).map_err(|source| LocatorError::InvalidSelector {
        field,
        selector: raw.to_string(),
        source,
    })
}

fn compile_list(field: &'static str, raw: &[String]) -> Result<Vec<Selector>, LocatorError> {
    raw.iter().map(|item| compile_one(field, item)).collect()
}

/// All locator sets known to the engine.
#[derive(Debug, Clone)]
pub struct LocatorCatalog {
    version: u32,
    sets: HashMap<PlatformVariant, LocatorSet>,
    control: Selector,
}

impl LocatorCatalog {
    /// Built-in sets for every supported platform.
    pub fn builtin() -> Result<Self, LocatorError> {
        Self::with_overrides(&CatalogOverrides::default())
    }

    /// Built-in sets with configuration overrides applied.
    pub fn with_overrides(overrides: &CatalogOverrides) -> Result<Self, LocatorError> {
        let mut sets = HashMap::new();
        for platform in [PlatformVariant::ProfessionalFeed, PlatformVariant::Microblog] {
            let Some(mut spec) = defaults::for_platform(platform) else {
                continue;
            };
            let patch = match platform {
                PlatformVariant::ProfessionalFeed => overrides.professional_feed.clone(),
                PlatformVariant::Microblog => overrides.microblog.clone(),
                PlatformVariant::Unknown => None,
            };
            if let Some(patch) = patch {
                spec = patch.apply(spec);
            }
            sets.insert(platform, LocatorSet::compile(&spec)?);
        }
        Ok(Self {
            version: defaults::LOCATOR_VERSION,
            sets,
            control: compile_one("control", &format!("[{CONTROL_ATTRIBUTE}]"))?,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// `None` for [`PlatformVariant::Unknown`], which disables everything downstream.
    pub fn for_platform(&self, platform: PlatformVariant) -> Option<&LocatorSet> {
        self.sets.get(&platform)
    }

    /// Matches the root of an injected control.
    pub fn control_selector(&self) -> &Selector {
        &self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_compiles() {
        let catalog = LocatorCatalog::builtin().unwrap();
        assert_eq!(catalog.version(), defaults::LOCATOR_VERSION);
        assert!(catalog.for_platform(PlatformVariant::Unknown).is_none());

        let pro = catalog
            .for_platform(PlatformVariant::ProfessionalFeed)
            .unwrap();
        assert_eq!(pro.min_unit_height, Some(100.0));
        assert!(pro.detail_view.is_none());

        let micro = catalog.for_platform(PlatformVariant::Microblog).unwrap();
        assert_eq!(micro.min_text_chars, Some(10));
        assert_eq!(micro.input_scope, InputScope::LatestInDocument);
        assert!(micro
            .detail_view
            .as_ref()
            .unwrap()
            .url_pattern
            .is_match("https://x.com/a/status/123"));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides: CatalogOverrides = serde_yaml::from_str(
            r#"
professional_feed:
  units: ["article.post"]
  min_unit_height: 40
"#,
        )
        .unwrap();
        let catalog = LocatorCatalog::with_overrides(&overrides).unwrap();
        let pro = catalog
            .for_platform(PlatformVariant::ProfessionalFeed)
            .unwrap();
        assert_eq!(pro.units.len(), 1);
        assert_eq!(pro.units[0].as_str(), "article.post");
        assert_eq!(pro.min_unit_height, Some(40.0));
        assert_eq!(pro.text.len(), defaults::professional_feed().text.len());
    }

    #[test]
    fn null_overrides_switch_limits_off() {
        let overrides: CatalogOverrides = serde_yaml::from_str(
            r#"
microblog:
  min_text_chars: null
  detail_view: null
professional_feed:
  min_unit_height: ~
"#,
        )
        .unwrap();
        let micro_override = overrides.microblog.as_ref().unwrap();
        assert_eq!(micro_override.min_text_chars, Some(None));
        assert_eq!(micro_override.min_unit_height, None);

        let catalog = LocatorCatalog::with_overrides(&overrides).unwrap();
        let micro = catalog.for_platform(PlatformVariant::Microblog).unwrap();
        assert_eq!(micro.min_text_chars, None);
        assert!(micro.detail_view.is_none());
        assert_eq!(micro.min_unit_height, defaults::microblog().min_unit_height);

        let pro = catalog
            .for_platform(PlatformVariant::ProfessionalFeed)
            .unwrap();
        assert_eq!(pro.min_unit_height, None);
    }

    #[test]
    fn bad_configuration_is_reported() {
        let overrides = CatalogOverrides {
            microblog: Some(LocatorOverride {
                inputs: Some(vec!["div:focus".into()]),
                ..LocatorOverride::default()
            }),
            ..CatalogOverrides::default()
        };
        let err = LocatorCatalog::with_overrides(&overrides).unwrap_err();
        assert!(matches!(
            err,
            LocatorError::InvalidSelector { field: "inputs", .. }
        ));

        let mut spec = defaults::microblog();
        spec.detail_view.as_mut().unwrap().url_pattern = "(".into();
        assert!(matches!(
            LocatorSet::compile(&spec),
            Err(LocatorError::InvalidPattern { .. })
        ));

        let mut spec = defaults::professional_feed();
        spec.units.clear();
        assert!(matches!(
            LocatorSet::compile(&spec),
            Err(LocatorError::EmptyList("units"))
        ));
    }
}
