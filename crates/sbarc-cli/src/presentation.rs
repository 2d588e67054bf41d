//! Terminal rendering of session output.

use sbarc_core::ports::OutputSink;
use sbarc_core::{ExitOutcome, OperationKind, OutputEvent, OutputPayload, SessionId, StreamChannel};

/// Which terminal stream a rendered line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
}

/// Prints tool output as it arrives. Tool stdout stays on stdout so it can
/// be piped; everything else goes to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn render(kind: OperationKind, event: &OutputEvent) -> (Target, String) {
        match &event.payload {
            OutputPayload::Line {
                channel: StreamChannel::Stdout,
                text,
            } => (Target::Stdout, text.clone()),
            OutputPayload::Line {
                channel: StreamChannel::Stderr,
                text,
            } => (Target::Stderr, text.clone()),
            OutputPayload::Line {
                channel: StreamChannel::Engine,
                text,
            } => (Target::Stderr, format!("$ {text}")),
            OutputPayload::Terminal { outcome } => (Target::Stderr, outcome_line(kind, outcome)),
        }
    }
}

/// One-line summary of how a run ended.
pub fn outcome_line(kind: OperationKind, outcome: &ExitOutcome) -> String {
    let mark = if outcome.is_success() { '✓' } else { '✗' };
    format!("{mark} {kind}: {outcome}")
}

impl OutputSink for ConsoleSink {
    fn on_event(&self, _session: SessionId, kind: OperationKind, event: &OutputEvent) {
        // The run handler prints the outcome after the session has settled.
        if event.is_terminal() {
            return;
        }
        match Self::render(kind, event) {
            (Target::Stdout, line) => println!("{line}"),
            (Target::Stderr, line) => eprintln!("{line}"),
        }
    }
}
