//! `ProcessRunner` backed by `tokio::process`.

use super::shutdown::shutdown_child;
use super::stream::{spawn_forwarder, spawn_stream_reader};
use super::{LaunchSpec, ProcessRunner, RunHandle};
use sbarc_core::{ExitOutcome, LaunchFailure, OutputEvent, StreamChannel};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long output may keep arriving after the process exits.
///
/// A grandchild that inherited the pipes can hold them open indefinitely;
/// after this the remaining output is abandoned and the run is reported.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(windows)]
pub(super) const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn start(&self, spec: LaunchSpec) -> RunHandle {
        if spec.cancel.is_cancelled() {
            debug!(program = %spec.program.display(), "Cancelled before spawn");
            return RunHandle::finished(spec.first_sequence, ExitOutcome::Cancelled, spec.cancel);
        }

        let mut child = match build_command(&spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %spec.program.display(), error = %e, "Failed to spawn process");
                let failure = LaunchFailure::Spawn {
                    program: spec.program.display().to_string(),
                    reason: e.to_string(),
                };
                return RunHandle::finished(
                    spec.first_sequence,
                    ExitOutcome::launch_failed(failure),
                    spec.cancel,
                );
            }
        };

        let pid = child.id();
        info!(pid = ?pid, program = %spec.program.display(), "Process started");

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_stream_reader(stdout, StreamChannel::Stdout, line_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_stream_reader(stderr, StreamChannel::Stderr, line_tx.clone()));
        }
        drop(line_tx);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let next_sequence = Arc::new(AtomicU64::new(spec.first_sequence));
        let forwarder = spawn_forwarder(line_rx, event_tx.clone(), Arc::clone(&next_sequence));

        tokio::spawn(supervise(Supervised {
            child,
            readers,
            forwarder,
            next_sequence,
            events: event_tx,
            cancel: spec.cancel.clone(),
            grace_period: spec.grace_period,
        }));

        RunHandle::new(pid, event_rx, spec.cancel)
    }
}

fn build_command(spec: &LaunchSpec) -> Command {
    let mut std_cmd = std::process::Command::new(&spec.program);
    std_cmd
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group so cancellation can signal the whole tree
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        std_cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(true);
    cmd
}

struct Supervised {
    child: Child,
    readers: Vec<JoinHandle<()>>,
    forwarder: JoinHandle<()>,
    next_sequence: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<OutputEvent>,
    cancel: CancellationToken,
    grace_period: Duration,
}

/// Wait for exit or cancellation, drain output, then emit the terminal event.
async fn supervise(mut run: Supervised) {
    let pid = run.child.id();

    let outcome = tokio::select! {
        biased;
        status = run.child.wait() => match status {
            Ok(status) => outcome_from_status(status),
            Err(e) => {
                warn!(pid = ?pid, error = %e, "Failed to wait for process");
                ExitOutcome::Failed { code: None }
            }
        },
        () = run.cancel.cancelled() => {
            info!(pid = ?pid, "Cancelling process");
            if let Err(e) = shutdown_child(&mut run.child, run.grace_period).await {
                warn!(pid = ?pid, error = %e, "Error during process shutdown");
            }
            ExitOutcome::Cancelled
        }
    };

    if timeout(DRAIN_TIMEOUT, &mut run.forwarder).await.is_err() {
        warn!(pid = ?pid, "Output still open after exit, abandoning remaining output");
        for reader in &run.readers {
            reader.abort();
        }
        run.forwarder.abort();
        let _ = (&mut run.forwarder).await;
    }

    let sequence = run.next_sequence.load(Ordering::SeqCst);
    info!(pid = ?pid, outcome = %outcome, "Process finished");
    // Receiver may already be gone if the session was dropped.
    let _ = run.events.send(OutputEvent::terminal(sequence, outcome));
}

fn outcome_from_status(status: ExitStatus) -> ExitOutcome {
    if status.success() {
        ExitOutcome::Succeeded
    } else {
        ExitOutcome::Failed {
            code: status.code(),
        }
    }
}
