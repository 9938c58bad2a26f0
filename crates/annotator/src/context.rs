use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_generation::GenerationClient;
use feedreply_injection::InjectionWriter;
use feedreply_locator::{ContentExtractor, LocatorCatalog, CONTROL_ATTRIBUTE};
use feedreply_page_dom::{DocumentSignal, HostDocument, NodeId};
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::config::AnnotatorConfig;
use crate::events::EngineEvent;

/// Everything one engine instance shares between its scan engine, watchers
/// and controllers.
pub(crate) struct EngineContext {
    pub doc: Arc<dyn HostDocument>,
    pub platform: PlatformVariant,
    pub catalog: Arc<LocatorCatalog>,
    pub extractor: ContentExtractor,
    pub generator: GenerationClient,
    pub writer: InjectionWriter,
    pub config: AnnotatorConfig,
    pub runtime: Handle,
    pub events: broadcast::Sender<EngineEvent>,
}

impl EngineContext {
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    /// Whether `node` is a control root or lies inside one.
    pub fn within_control(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.doc.attribute(id, CONTROL_ATTRIBUTE).is_some() {
                return true;
            }
            current = self.doc.parent(id);
        }
        false
    }

    /// Mutations the engine made itself: control insertion and control
    /// rendering. Reacting to them would only schedule redundant scans.
    pub fn is_own_mutation(&self, signal: &DocumentSignal) -> bool {
        match signal {
            DocumentSignal::ChildList {
                target,
                added,
                removed,
            } => {
                self.within_control(*target)
                    || (removed.is_empty()
                        && !added.is_empty()
                        && added
                            .iter()
                            .all(|node| self.doc.attribute(*node, CONTROL_ATTRIBUTE).is_some()))
            }
            DocumentSignal::Attributes { target, .. } | DocumentSignal::CharacterData { target } => {
                self.within_control(*target)
            }
            DocumentSignal::History { .. } => false,
        }
    }
}
