//! Reply Controller: the state machine behind one control.
//!
//! All state changes go through [`ReplyController::transition`], which also
//! owns every presentational side effect, so tests can assert on
//! [`ControlState`] and ignore markup. A control is disabled from the moment
//! it leaves `Idle` until it returns there, which is what serialises its own
//! cycles. Different controls never wait on each other.

use std::sync::{Arc, Weak};
use std::time::Duration;

use feedreply_core_types::{ControlState, GenerationResult, ReplyError, UsageProblem};
use feedreply_injection::InjectionReport;
use feedreply_page_dom::{listener, DomError, EventKind, ListenerVerdict, NodeId};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::context::EngineContext;
use crate::control::{truncate_status, Control, ERROR_CLASS, SUCCESS_CLASS};
use crate::events::EngineEvent;

pub const GENERATING_STATUS: &str = "Generating…";
pub const SUCCESS_STATUS: &str = "✓ Reply generated";

struct ControllerInner {
    state: ControlState,
    disabled: bool,
    cycles: u64,
    reset: Option<JoinHandle<()>>,
}

struct CycleOutcome {
    result: GenerationResult,
    injection: InjectionReport,
}

pub struct ReplyController {
    ctx: Arc<EngineContext>,
    control: Control,
    unit: NodeId,
    inner: Mutex<ControllerInner>,
}

impl ReplyController {
    pub(crate) fn new(ctx: Arc<EngineContext>, control: Control, unit: NodeId) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            control,
            unit,
            inner: Mutex::new(ControllerInner {
                state: ControlState::Idle,
                disabled: false,
                cycles: 0,
                reset: None,
            }),
        })
    }

    /// Activates on clicks anywhere inside the control.
    pub(crate) fn bind(self: &Arc<Self>) {
        let weak: Weak<ReplyController> = Arc::downgrade(self);
        self.ctx.doc.add_listener(
            self.control.root,
            EventKind::Click,
            listener(move |_| {
                if let Some(controller) = weak.upgrade() {
                    controller.activate();
                }
                // Keep the host from treating the click as "open this post".
                Ok(ListenerVerdict::PreventDefault)
            }),
        );
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn unit(&self) -> NodeId {
        self.unit
    }

    pub fn state(&self) -> ControlState {
        self.inner.lock().state
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.lock().disabled
    }

    /// Completed and in-flight cycles so far.
    pub fn cycles(&self) -> u64 {
        self.inner.lock().cycles
    }

    /// Starts a cycle when the control is idle and enabled. Returns whether a
    /// cycle was started.
    pub fn activate(self: &Arc<Self>) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.disabled || !inner.state.accepts_activation() {
                debug!(control = %self.control.id.short(), state = %inner.state, "activation ignored");
                return false;
            }
            inner.cycles += 1;
        }
        if !self.transition(ControlState::Generating, GENERATING_STATUS) {
            return false;
        }
        let controller = Arc::clone(self);
        self.ctx.runtime.spawn(async move {
            controller.run_cycle().await;
        });
        true
    }

    /// Aborts a pending return to `Idle`. Used on engine shutdown.
    pub(crate) fn cancel_reset(&self) {
        if let Some(reset) = self.inner.lock().reset.take() {
            reset.abort();
        }
    }

    async fn run_cycle(self: Arc<Self>) {
        match self.pipeline().await {
            Ok(outcome) => self.succeed(outcome),
            Err(err) => self.fail(err),
        }
    }

    /// Credential check, extraction, generation, injection, strictly in order.
    /// The store is read first so a signed-out user never has the page
    /// touched or the service called.
    #[instrument(
        skip_all,
        fields(control = %self.control.id.short(), unit = %self.unit, platform = %self.ctx.platform)
    )]
    async fn pipeline(&self) -> Result<CycleOutcome, ReplyError> {
        let platform = self.ctx.platform;
        let session = self.ctx.generator.session(platform).await?;

        let text = self
            .ctx
            .extractor
            .extract(self.ctx.doc.as_ref(), Some(self.unit), platform);
        if text.is_empty() {
            return Err(ReplyError::Usage(UsageProblem::NoText));
        }
        debug!(
            chars = text.chars().count(),
            tone = session.tone().as_str(),
            emojis = session.include_emojis(),
            "extracted unit text"
        );

        let result = session.generate(&text).await?;
        let injection = self.ctx.writer.inject(
            self.ctx.doc.as_ref(),
            &result.reply,
            Some(self.unit),
            platform,
        )?;
        Ok(CycleOutcome { result, injection })
    }

    fn succeed(self: &Arc<Self>, outcome: CycleOutcome) {
        let CycleOutcome { result, injection } = outcome;
        match &result.usage {
            Some(usage) => info!(control = %self.control.id.short(), %usage, "reply cycle succeeded"),
            None => info!(control = %self.control.id.short(), "reply cycle succeeded"),
        }
        self.ctx.emit(EngineEvent::Injected {
            control: self.control.id.clone(),
            unit: self.unit,
            reply: result.reply,
            method: injection.method,
            usage: result.usage,
        });
        self.transition(ControlState::Success, SUCCESS_STATUS);
        self.schedule_reset(self.ctx.config.success_display());
    }

    fn fail(self: &Arc<Self>, err: ReplyError) {
        warn!(
            control = %self.control.id.short(),
            kind = err.kind(),
            error = %err,
            "reply cycle failed"
        );
        let message = err.user_message();
        if err.requires_reauth() {
            self.ctx
                .doc
                .notify_user(&format!("FeedReply: {message} Open the FeedReply popup to sign in."));
        }
        let status = truncate_status(&message, self.ctx.config.status_max_chars);
        self.transition(ControlState::Error, &status);
        self.schedule_reset(self.ctx.config.error_display());
    }

    fn schedule_reset(self: &Arc<Self>, delay: Duration) {
        let controller = Arc::clone(self);
        let handle = self.ctx.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            controller.transition(ControlState::Idle, "");
        });
        if let Some(previous) = self.inner.lock().reset.replace(handle) {
            previous.abort();
        }
    }

    /// The single place a control changes state.
    fn transition(&self, next: ControlState, status: &str) -> bool {
        {
            let mut inner = self.inner.lock();
            if !inner.state.can_transition_to(next) {
                warn!(
                    control = %self.control.id.short(),
                    from = %inner.state,
                    to = %next,
                    "rejected control transition"
                );
                return false;
            }
            inner.state = next;
            inner.disabled = next != ControlState::Idle;
            if next == ControlState::Idle {
                inner.reset = None;
            }
        }
        self.render(next, status);
        self.ctx.emit(EngineEvent::ControlState {
            control: self.control.id.clone(),
            unit: self.unit,
            state: next,
            status: status.to_string(),
        });
        true
    }

    fn render(&self, state: ControlState, status: &str) {
        if let Err(err) = self.paint(state, status) {
            debug!(control = %self.control.id.short(), error = %err, "control render failed");
        }
    }

    fn paint(&self, state: ControlState, status: &str) -> Result<(), DomError> {
        let doc = self.ctx.doc.as_ref();
        let control = &self.control;
        let busy = state == ControlState::Generating;

        doc.set_attribute(control.root, "data-state", state.name())?;
        if state == ControlState::Idle {
            doc.remove_attribute(control.root, "aria-disabled")?;
        } else {
            doc.set_attribute(control.root, "aria-disabled", "true")?;
        }
        doc.set_hidden(control.icon, busy)?;
        doc.set_hidden(control.spinner, !busy)?;
        doc.set_text(control.status, status)?;
        match state {
            ControlState::Success => doc.add_class(control.root, SUCCESS_CLASS),
            ControlState::Error => doc.add_class(control.root, ERROR_CLASS),
            ControlState::Idle | ControlState::Generating => {
                doc.remove_class(control.root, SUCCESS_CLASS)?;
                doc.remove_class(control.root, ERROR_CLASS)
            }
        }
    }
}

impl std::fmt::Debug for ReplyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyController")
            .field("control", &self.control.id.short())
            .field("unit", &self.unit)
            .field("state", &self.state())
            .finish()
    }
}
