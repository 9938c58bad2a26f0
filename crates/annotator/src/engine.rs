use std::sync::Arc;

use feedreply_core_types::{detect_platform, PlatformVariant};
use feedreply_generation::GenerationClient;
use feedreply_injection::InjectionWriter;
use feedreply_locator::{ContentExtractor, LocatorCatalog};
use feedreply_page_dom::{HostDocument, NodeId};
use feedreply_store::PreferenceStore;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::AnnotatorConfig;
use crate::context::EngineContext;
use crate::controller::ReplyController;
use crate::errors::AnnotatorError;
use crate::events::{EngineEvent, ScanReport};
use crate::scan::ScanEngine;
use crate::watcher::ChangeWatcher;

const EVENT_CAPACITY: usize = 256;

/// One engine per page. Owns the processed set, every controller, the
/// debounce timers and the watcher tasks; nothing lives in globals, so any
/// number of isolated instances can run side by side.
pub struct Annotator {
    ctx: Arc<EngineContext>,
    scan: Arc<ScanEngine>,
    watcher: Mutex<Option<ChangeWatcher>>,
}

impl Annotator {
    /// Must be called from within a tokio runtime; its handle drives every
    /// timer and cycle this engine starts.
    pub fn new(
        doc: Arc<dyn HostDocument>,
        store: Arc<dyn PreferenceStore>,
        config: AnnotatorConfig,
    ) -> Result<Self, AnnotatorError> {
        let runtime = Handle::try_current().map_err(|_| AnnotatorError::NoRuntime)?;
        let platform = detect_platform(&doc.location());
        let catalog = Arc::new(LocatorCatalog::with_overrides(&config.locators)?);
        let generator = GenerationClient::new(config.generation.clone(), store)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let ctx = Arc::new(EngineContext {
            doc,
            platform,
            extractor: ContentExtractor::new(Arc::clone(&catalog)),
            writer: InjectionWriter::new(Arc::clone(&catalog)),
            catalog,
            generator,
            config,
            runtime,
            events,
        });
        Ok(Self {
            scan: Arc::new(ScanEngine::new(Arc::clone(&ctx))),
            ctx,
            watcher: Mutex::new(None),
        })
    }

    pub fn platform(&self) -> PlatformVariant {
        self.ctx.platform
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.ctx.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.ctx.events.subscribe()
    }

    /// Runs one scan immediately, outside the debounce.
    pub fn scan_now(&self) -> ScanReport {
        self.scan.scan()
    }

    /// Initial scan, then the watchers. Calling it again is a no-op.
    pub fn start(&self) -> ScanReport {
        if !self.ctx.platform.is_known() {
            debug!(location = %self.ctx.doc.location(), "unsupported page; annotator not started");
            return ScanReport::default();
        }
        let mut watcher = self.watcher.lock();
        if watcher.is_some() {
            return ScanReport {
                in_scope: true,
                ..ScanReport::default()
            };
        }
        // Subscribe first so nothing between the scan and the watchers is lost.
        *watcher = Some(ChangeWatcher::start(
            Arc::clone(&self.ctx),
            Arc::clone(&self.scan),
        ));
        drop(watcher);
        let report = self.scan.scan();
        info!(
            platform = %self.ctx.platform,
            location = %self.ctx.doc.location(),
            annotated = report.annotated.len(),
            "annotator started"
        );
        report
    }

    pub fn is_running(&self) -> bool {
        self.watcher.lock().is_some()
    }

    /// Whether a debounced or post-navigation scan is scheduled.
    pub fn has_pending_scan(&self) -> bool {
        self.watcher
            .lock()
            .as_ref()
            .is_some_and(ChangeWatcher::has_pending_scan)
    }

    /// Stops the watchers, pending scans and pending returns to idle.
    /// Generation calls already in flight finish on their own.
    pub fn shutdown(&self) {
        if let Some(mut watcher) = self.watcher.lock().take() {
            watcher.stop();
        }
        for controller in self.scan.controllers() {
            controller.cancel_reset();
        }
        info!(platform = %self.ctx.platform, "annotator stopped");
    }

    /// Forgets processed units, as a navigation does.
    pub fn clear_processed(&self) -> usize {
        self.scan.clear_processed()
    }

    pub fn is_processed(&self, unit: NodeId) -> bool {
        self.scan.is_processed(unit)
    }

    pub fn processed_count(&self) -> usize {
        self.scan.processed_count()
    }

    pub fn controller_for(&self, unit: NodeId) -> Option<Arc<ReplyController>> {
        self.scan.controller_for(unit)
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("platform", &self.ctx.platform)
            .field("processed", &self.scan.processed_count())
            .field("running", &self.is_running())
            .finish()
    }
}
