//! The embedding script/GUI runtime, consumed as-is.

use crate::debugger::{BreakpointInfo, TracepointInfo};

/// Lifecycle event for breakpoint/tracepoint change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointEvent {
    Create,
    Delete,
    Modify,
}

impl PointEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            PointEvent::Create => "create",
            PointEvent::Delete => "delete",
            PointEvent::Modify => "modify",
        }
    }
}

/// What the binding layer needs from the embedding runtime: a live display
/// for uncaptured text, busy/idle hooks, an event pump serviced at yield
/// points, a user cancellation flag, and change notifications.
pub trait ScriptRuntime {
    fn display(&mut self, text: &str);

    fn busy(&mut self) {}
    fn idle(&mut self) {}

    /// Process pending GUI events. Called from the session's pump tick.
    fn pump_events(&mut self) {}

    /// Whether the user asked to cancel the in-progress bulk transfer.
    fn cancel_requested(&mut self) -> bool {
        false
    }

    fn breakpoint_event(&mut self, _event: PointEvent, _info: &BreakpointInfo) {}
    fn tracepoint_event(&mut self, _event: PointEvent, _info: &TracepointInfo) {}
}
