//! Output sink implementations.
//!
//! - `ChannelSink` - forwards into a tokio channel, for a UI thread to drain
//! - `TracingSink` - writes every event to the log

use sbarc_core::ports::OutputSink;
use sbarc_core::{OperationKind, OutputEvent, OutputPayload, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// An output event tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub session: SessionId,
    pub kind: OperationKind,
    pub event: OutputEvent,
}

/// Sink that forwards every event into an unbounded channel.
///
/// The receiver can be drained with `try_recv` from a non-async thread,
/// so a UI loop can poll it once per frame.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn on_event(&self, session: SessionId, kind: OperationKind, event: &OutputEvent) {
        let message = SessionEvent {
            session,
            kind,
            event: event.clone(),
        };
        if self.tx.send(message).is_err() {
            debug!(%session, "Output receiver dropped, discarding event");
        }
    }
}

/// Sink that logs lines at debug and outcomes at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn on_event(&self, session: SessionId, kind: OperationKind, event: &OutputEvent) {
        match &event.payload {
            OutputPayload::Line { channel, text } => {
                debug!(%session, %kind, seq = event.sequence, stream = channel.as_str(), "{text}");
            }
            OutputPayload::Terminal { outcome } => {
                info!(%session, %kind, seq = event.sequence, %outcome, "Session finished");
            }
        }
    }
}
