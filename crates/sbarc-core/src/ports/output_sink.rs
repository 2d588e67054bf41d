//! Output sink port for live session output.
//!
//! This port abstracts where session events go: a channel drained by a UI
//! thread, the terminal, or nowhere.

use crate::config::OperationKind;
use crate::events::{OutputEvent, SessionId};

/// Receives every event of every session, in sequence order per session.
///
/// Implementations are called from runtime tasks and must not block.
pub trait OutputSink: Send + Sync {
    fn on_event(&self, session: SessionId, kind: OperationKind, event: &OutputEvent);
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl OutputSink for NoopSink {
    fn on_event(&self, _session: SessionId, _kind: OperationKind, _event: &OutputEvent) {}
}
