//! Scan Engine: finds eligible content units and attaches one control each.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use feedreply_locator::{find_units, is_detail_view, resolve_anchor, LocatorSet};
use feedreply_page_dom::NodeId;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::control::ControlFactory;
use crate::controller::ReplyController;
use crate::events::{EngineEvent, ScanReport};

enum Verdict {
    Attach,
    Adopt,
    Filtered(&'static str),
}

pub(crate) struct ScanEngine {
    ctx: Arc<EngineContext>,
    factory: ControlFactory,
    processed: Mutex<HashSet<NodeId>>,
    controllers: Mutex<HashMap<NodeId, Arc<ReplyController>>>,
}

impl ScanEngine {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self {
            ctx,
            factory: ControlFactory,
            processed: Mutex::new(HashSet::new()),
            controllers: Mutex::new(HashMap::new()),
        }
    }

    /// One pass over the page. Safe to call any number of times: processed
    /// units are skipped and units already carrying a control are adopted,
    /// never annotated twice.
    pub fn scan(&self) -> ScanReport {
        let report = self.scan_inner();
        if !report.annotated.is_empty() {
            info!(
                platform = %self.ctx.platform,
                annotated = report.annotated.len(),
                candidates = report.candidates,
                "annotated content units"
            );
        }
        self.ctx.emit(EngineEvent::ScanCompleted(report.clone()));
        report
    }

    fn scan_inner(&self) -> ScanReport {
        self.prune_detached();
        let mut report = ScanReport::default();
        let Some(set) = self.ctx.catalog.for_platform(self.ctx.platform) else {
            debug!("no locator set for this page; scan skipped");
            return report;
        };
        let doc = self.ctx.doc.as_ref();
        if !is_detail_view(doc, set) {
            debug!(location = %doc.location(), "feed view; scan skipped");
            return report;
        }
        report.in_scope = true;

        let units = find_units(doc, set);
        report.candidates = units.len();
        for unit in units {
            if self.processed.lock().contains(&unit) {
                continue;
            }
            match self.judge(unit, set) {
                Verdict::Adopt => {
                    self.processed.lock().insert(unit);
                    report.adopted += 1;
                }
                Verdict::Filtered(reason) => {
                    debug!(%unit, reason, "unit filtered");
                    report.filtered += 1;
                }
                Verdict::Attach => {
                    // Recorded before the control exists so an overlapping
                    // scan can never attach a second one.
                    if !self.processed.lock().insert(unit) {
                        continue;
                    }
                    if self.attach(unit, set) {
                        report.annotated.push(unit);
                    } else {
                        self.processed.lock().remove(&unit);
                    }
                }
            }
        }
        report
    }

    fn judge(&self, unit: NodeId, set: &LocatorSet) -> Verdict {
        let doc = self.ctx.doc.as_ref();
        let control = self.ctx.catalog.control_selector();
        if doc.query_first(unit, control).is_some() {
            return Verdict::Adopt;
        }
        if let Some(min_height) = set.min_unit_height {
            if doc.rendered_height(unit) < min_height {
                return Verdict::Filtered("below minimum height");
            }
        }
        if let Some(min_chars) = set.min_text_chars {
            if doc.visible_text(unit, Some(control)).chars().count() < min_chars {
                return Verdict::Filtered("too little text");
            }
        }
        Verdict::Attach
    }

    fn attach(&self, unit: NodeId, set: &LocatorSet) -> bool {
        let doc = &self.ctx.doc;
        let control = match self.factory.create(doc) {
            Ok(control) => control,
            Err(err) => {
                debug!(%unit, error = %err, "control construction failed");
                return false;
            }
        };
        let anchor = resolve_anchor(doc.as_ref(), unit, set);
        let controller = ReplyController::new(Arc::clone(&self.ctx), control.clone(), unit);
        controller.bind();
        if let Err(err) = doc.append_child(anchor.node(), control.root) {
            debug!(%unit, ?anchor, error = %err, "control placement failed");
            return false;
        }
        debug!(%unit, ?anchor, control = %control.id.short(), "control attached");
        self.controllers.lock().insert(unit, controller);
        self.ctx.emit(EngineEvent::Annotated {
            unit,
            control: control.id,
        });
        true
    }

    /// Drops bookkeeping for units the page has removed, along with
    /// controllers whose control was taken out from under them.
    fn prune_detached(&self) {
        let doc = self.ctx.doc.as_ref();
        let forgotten = {
            let mut processed = self.processed.lock();
            let before = processed.len();
            processed.retain(|unit| doc.is_connected(*unit));
            before - processed.len()
        };
        let dropped: Vec<_> = {
            let mut controllers = self.controllers.lock();
            let gone: Vec<NodeId> = controllers
                .iter()
                .filter(|(unit, controller)| {
                    !doc.is_connected(**unit) || !doc.is_connected(controller.control().root)
                })
                .map(|(unit, _)| *unit)
                .collect();
            gone.iter().filter_map(|unit| controllers.remove(unit)).collect()
        };
        for controller in &dropped {
            controller.cancel_reset();
        }
        if forgotten > 0 || !dropped.is_empty() {
            debug!(forgotten, controllers = dropped.len(), "pruned detached units");
        }
    }

    /// Forgets every processed unit and drops controllers whose control left
    /// the page. Returns how many units were forgotten.
    pub fn clear_processed(&self) -> usize {
        let cleared = {
            let mut processed = self.processed.lock();
            let cleared = processed.len();
            processed.clear();
            cleared
        };
        let doc = self.ctx.doc.as_ref();
        self.controllers
            .lock()
            .retain(|_, controller| doc.is_connected(controller.control().root));
        cleared
    }

    pub fn is_processed(&self, unit: NodeId) -> bool {
        self.processed.lock().contains(&unit)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.lock().len()
    }

    pub fn controller_for(&self, unit: NodeId) -> Option<Arc<ReplyController>> {
        self.controllers.lock().get(&unit).cloned()
    }

    pub fn controllers(&self) -> Vec<Arc<ReplyController>> {
        self.controllers.lock().values().cloned().collect()
    }
}
