//! Change Watcher: the structural monitor and the microblog navigation
//! monitor, both fed by the document's signal stream.

use std::sync::Arc;

use feedreply_core_types::PlatformVariant;
use feedreply_page_dom::DocumentSignal;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::EngineContext;
use crate::debounce::Debouncer;
use crate::events::EngineEvent;
use crate::scan::ScanEngine;

pub(crate) struct ChangeWatcher {
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    structural: Arc<Debouncer>,
    navigation: Option<Arc<Debouncer>>,
}

impl ChangeWatcher {
    /// Subscribes before returning, so every change made after this call is
    /// observed.
    pub fn start(ctx: Arc<EngineContext>, scan: Arc<ScanEngine>) -> Self {
        let shutdown = CancellationToken::new();
        let structural = Arc::new(rescan_debouncer(&ctx, &scan, ctx.config.debounce()));
        let mut tasks = vec![ctx.runtime.spawn(watch_structure(
            Arc::clone(&ctx),
            ctx.doc.subscribe(),
            Arc::clone(&structural),
            shutdown.clone(),
        ))];

        let navigation = (ctx.platform == PlatformVariant::Microblog).then(|| {
            let settle = Arc::new(rescan_debouncer(&ctx, &scan, ctx.config.navigation_settle()));
            tasks.push(ctx.runtime.spawn(watch_navigation(
                Arc::clone(&ctx),
                ctx.doc.subscribe(),
                Arc::clone(&scan),
                Arc::clone(&settle),
                shutdown.clone(),
            )));
            settle
        });
        debug!(
            platform = %ctx.platform,
            navigation = navigation.is_some(),
            "change watchers started"
        );

        Self {
            shutdown,
            tasks,
            structural,
            navigation,
        }
    }

    pub fn has_pending_scan(&self) -> bool {
        self.structural.is_pending()
            || self
                .navigation
                .as_ref()
                .is_some_and(|settle| settle.is_pending())
    }

    pub fn stop(&mut self) {
        self.shutdown.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.structural.cancel();
        if let Some(settle) = &self.navigation {
            settle.cancel();
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn rescan_debouncer(
    ctx: &Arc<EngineContext>,
    scan: &Arc<ScanEngine>,
    delay: std::time::Duration,
) -> Debouncer {
    let scan = Arc::clone(scan);
    Debouncer::new(ctx.runtime.clone(), delay, move || {
        scan.scan();
    })
}

async fn watch_structure(
    ctx: Arc<EngineContext>,
    mut rx: Receiver<DocumentSignal>,
    debouncer: Arc<Debouncer>,
    shutdown: CancellationToken,
) {
    loop {
        select! {
            _ = shutdown.cancelled() => break,
            signal = rx.recv() => match signal {
                Ok(signal) => {
                    if signal.is_structural() && !ctx.is_own_mutation(&signal) {
                        debouncer.trigger();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Something changed; we just don't know what.
                    warn!(skipped, "document signal stream lagged");
                    debouncer.trigger();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
    debug!("structural watcher exited");
}

async fn watch_navigation(
    ctx: Arc<EngineContext>,
    mut rx: Receiver<DocumentSignal>,
    scan: Arc<ScanEngine>,
    settle: Arc<Debouncer>,
    shutdown: CancellationToken,
) {
    let mut last_location = ctx.doc.location();
    loop {
        let signal = select! {
            _ = shutdown.cancelled() => break,
            signal = rx.recv() => signal,
        };
        let relevant = match &signal {
            Ok(DocumentSignal::History { .. }) => true,
            Ok(signal @ DocumentSignal::Attributes { .. }) => !ctx.is_own_mutation(signal),
            Ok(_) => false,
            Err(RecvError::Lagged(_)) => true,
            Err(RecvError::Closed) => break,
        };
        if !relevant {
            continue;
        }
        let location = ctx.doc.location();
        if location == last_location {
            continue;
        }
        let cleared = scan.clear_processed();
        info!(from = %last_location, to = %location, cleared, "navigation detected; processed set cleared");
        ctx.emit(EngineEvent::ProcessedReset {
            location: location.clone(),
            cleared,
        });
        last_location = location;
        settle.trigger();
    }
    debug!("navigation watcher exited");
}
