//! Best-effort progress reporting.
//!
//! The engine calls [`ProgressSink::on_expand`] after every committed
//! expansion. Sinks must not block; a panicking sink is ignored.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

/// Snapshot taken after one committed expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Committed expansions so far (including this one).
    pub expansions: u64,
    pub frontier_len: usize,
    /// Depth of the node just expanded.
    pub depth: u32,
    /// Priority of the node just expanded.
    pub priority: i64,
    pub elapsed: Duration,
}

/// Receiver of progress events (e.g. a terminal spinner).
pub trait ProgressSink: Send + Sync {
    fn on_expand(&self, event: &ProgressEvent);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_expand(&self, _event: &ProgressEvent) {}
}

/// Deliver `event`, swallowing any panic from the sink.
pub(crate) fn notify(sink: &dyn ProgressSink, event: &ProgressEvent) {
    let _ = catch_unwind(AssertUnwindSafe(|| sink.on_expand(event)));
}
