use std::collections::HashMap;
use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_locator::{resolve_input, LocatorCatalog};
use feedreply_page_dom::{HostDocument, NodeId};
use tracing::{info, instrument};

use crate::errors::InjectionError;
use crate::model::{InjectionReport, SurfaceKind};
use crate::strategy::{DirectAssignment, InjectionStrategy, SyntheticPaste};

/// Finds the platform's input surface and hands the text to the strategy
/// registered for that kind of surface.
#[derive(Clone)]
pub struct InjectionWriter {
    catalog: Arc<LocatorCatalog>,
    strategies: HashMap<SurfaceKind, Arc<dyn InjectionStrategy>>,
}

impl InjectionWriter {
    pub fn new(catalog: Arc<LocatorCatalog>) -> Self {
        let mut strategies: HashMap<SurfaceKind, Arc<dyn InjectionStrategy>> = HashMap::new();
        strategies.insert(SurfaceKind::NativeEditable, Arc::new(DirectAssignment));
        strategies.insert(SurfaceKind::FrameworkComposer, Arc::new(SyntheticPaste));
        Self {
            catalog,
            strategies,
        }
    }

    /// Replaces the strategy used for one kind of surface.
    pub fn with_strategy(mut self, kind: SurfaceKind, strategy: Arc<dyn InjectionStrategy>) -> Self {
        self.strategies.insert(kind, strategy);
        self
    }

    pub fn strategy_for(&self, kind: SurfaceKind) -> Option<&dyn InjectionStrategy> {
        self.strategies.get(&kind).map(|strategy| strategy.as_ref())
    }

    /// Writes `text` into the input surface belonging to `unit`.
    #[instrument(skip_all, fields(platform = %platform, chars = text.chars().count()))]
    pub fn inject(
        &self,
        doc: &dyn HostDocument,
        text: &str,
        unit: Option<NodeId>,
        platform: PlatformVariant,
    ) -> Result<InjectionReport, InjectionError> {
        let kind = SurfaceKind::for_platform(platform).ok_or(InjectionError::NoSurface)?;
        let set = self
            .catalog
            .for_platform(platform)
            .ok_or(InjectionError::NoSurface)?;
        let strategy = self.strategy_for(kind).ok_or(InjectionError::NoSurface)?;
        let surface = resolve_input(doc, unit, set).ok_or(InjectionError::NoSurface)?;

        let method = strategy.inject_into(doc, surface, text)?;
        info!(
            %surface,
            surface_kind = %kind,
            strategy = strategy.name(),
            method = method.name(),
            "reply injected"
        );
        Ok(InjectionReport {
            surface,
            kind,
            method,
            chars: text.chars().count(),
        })
    }
}

impl std::fmt::Debug for InjectionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self
            .strategies
            .iter()
            .map(|(kind, strategy)| (kind.name(), strategy.name()))
            .collect();
        kinds.sort();
        f.debug_struct("InjectionWriter")
            .field("strategies", &kinds)
            .finish()
    }
}
