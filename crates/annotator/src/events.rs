use feedreply_core_types::{ControlId, ControlState, Usage};
use feedreply_injection::InjectionMethod;
use feedreply_page_dom::NodeId;

/// Result of one scan pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// False when the page is unsupported or outside the scanned view.
    pub in_scope: bool,
    pub candidates: usize,
    /// Units that received a control in this pass.
    pub annotated: Vec<NodeId>,
    /// Units that already carried a control and were re-recorded as processed.
    pub adopted: usize,
    /// Units rejected by the height or text filters.
    pub filtered: usize,
}

/// What the engine did, for callers that observe rather than poll.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Annotated {
        unit: NodeId,
        control: ControlId,
    },
    ScanCompleted(ScanReport),
    ProcessedReset {
        location: String,
        cleared: usize,
    },
    ControlState {
        control: ControlId,
        unit: NodeId,
        state: ControlState,
        status: String,
    },
    Injected {
        control: ControlId,
        unit: NodeId,
        reply: String,
        method: InjectionMethod,
        usage: Option<Usage>,
    },
}
