//! Process runner: spawn an external tool and stream its output.
//!
//! # Structure
//!
//! - `ProcessRunner` - the seam sessions depend on
//! - `TokioProcessRunner` - real child processes via `tokio::process`
//! - `RunHandle` - ordered event stream plus cancellation for one run
//! - `shutdown` - SIGTERM → grace period → SIGKILL escalation
//!
//! Every run ends with exactly one `Terminal` event, after every line the
//! run produced. A spawn failure is reported the same way, as a handle with
//! no pid whose only event is `Terminal(LaunchFailed)`.

mod runner;
pub mod shutdown;
mod stream;

pub use runner::{DRAIN_TIMEOUT, TokioProcessRunner};

use sbarc_core::{ExitOutcome, OutputEvent};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything a runner needs to start one process.
///
/// `args` carries real values, secrets included. It must never be logged;
/// log the redacted command instead.
#[derive(Clone)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Sequence number of the first event the runner emits.
    pub first_sequence: u64,
    /// Time between SIGTERM and SIGKILL after cancellation.
    pub grace_period: Duration,
    pub cancel: CancellationToken,
}

impl std::fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("program", &self.program)
            .field("args", &self.args.len())
            .field("first_sequence", &self.first_sequence)
            .field("grace_period", &self.grace_period)
            .finish_non_exhaustive()
    }
}

/// Starts processes.
///
/// `start` never fails: problems surface as the handle's terminal event.
/// It must be called from within a tokio runtime.
pub trait ProcessRunner: Send + Sync {
    fn start(&self, spec: LaunchSpec) -> RunHandle;
}

/// A started (or failed-to-start) run.
#[derive(Debug)]
pub struct RunHandle {
    pid: Option<u32>,
    events: mpsc::UnboundedReceiver<OutputEvent>,
    cancel: CancellationToken,
}

impl RunHandle {
    /// Wrap an event stream produced by a runner.
    pub const fn new(
        pid: Option<u32>,
        events: mpsc::UnboundedReceiver<OutputEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pid,
            events,
            cancel,
        }
    }

    /// A handle whose only event is the given terminal outcome.
    pub fn finished(sequence: u64, outcome: ExitOutcome, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(OutputEvent::terminal(sequence, outcome));
        Self::new(None, rx, cancel)
    }

    /// OS process id, `None` when nothing was spawned.
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next event in sequence order; `None` once the terminal event has
    /// been taken and the stream closed.
    pub async fn next_event(&mut self) -> Option<OutputEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<OutputEvent> {
        self.events.try_recv().ok()
    }

    /// Request shutdown. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain the remaining events and return the outcome.
    pub async fn wait(mut self) -> ExitOutcome {
        while let Some(event) = self.events.recv().await {
            if let Some(outcome) = event.outcome() {
                return outcome.clone();
            }
        }
        ExitOutcome::Failed { code: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbarc_core::{LaunchFailure, StreamChannel};

    #[tokio::test]
    async fn finished_handle_yields_single_terminal() {
        let failure = LaunchFailure::Spawn {
            program: "sbstck-dl".into(),
            reason: "permission denied".into(),
        };
        let mut handle = RunHandle::finished(
            1,
            ExitOutcome::launch_failed(failure),
            CancellationToken::new(),
        );
        assert_eq!(handle.pid(), None);

        let event = handle.next_event().await.unwrap();
        assert_eq!(event.sequence, 1);
        assert!(event.is_terminal());
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn wait_skips_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(OutputEvent::line(1, StreamChannel::Stdout, "a")).unwrap();
        tx.send(OutputEvent::terminal(2, ExitOutcome::Succeeded)).unwrap();
        drop(tx);

        let handle = RunHandle::new(Some(42), rx, CancellationToken::new());
        assert_eq!(handle.wait().await, ExitOutcome::Succeeded);
    }

    #[tokio::test]
    async fn closed_stream_without_terminal_is_failure() {
        let (tx, rx) = mpsc::unbounded_channel::<OutputEvent>();
        drop(tx);
        let handle = RunHandle::new(None, rx, CancellationToken::new());
        assert_eq!(handle.wait().await, ExitOutcome::Failed { code: None });
    }

    #[test]
    fn launch_spec_debug_hides_args() {
        let spec = LaunchSpec {
            program: PathBuf::from("/usr/bin/sbstck-dl"),
            args: vec!["--cookie_val".into(), "hunter2".into()],
            first_sequence: 1,
            grace_period: Duration::from_secs(5),
            cancel: CancellationToken::new(),
        };
        assert!(!format!("{spec:?}").contains("hunter2"));
    }
}
