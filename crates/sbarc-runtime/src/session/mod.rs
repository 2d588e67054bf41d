//! Execution session: one configuration driven from build to outcome.
//!
//! ```text
//! prepare: Idle → Building → (Invalid)
//! run:     Building → Completed                       (dry run)
//!          Building → Launched → LaunchError | Failed | Cancelled
//!          Building → Launched → Running → Completed | Failed | Cancelled
//! ```
//!
//! Event sequence numbers start at 0. The first event of a real run is the
//! redacted command line on the `Engine` channel; process output follows
//! from 1. The terminal event is always last.

mod buffer;
mod handle;

pub use buffer::OutputBuffer;
pub use handle::SessionHandle;

use crate::process::{LaunchSpec, ProcessRunner};
use handle::SessionShared;
use sbarc_core::ports::{ExecutableResolver, OutputSink, Tool};
use sbarc_core::{
    Command, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_RETAINED_LINES, ExitOutcome, LaunchFailure,
    OperationConfig, OutputEvent, SessionState, Settings, StreamChannel, ValidationError, build,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Per-session knobs, usually derived from [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Build and show the command without resolving or running anything.
    pub dry_run: bool,
    pub grace_period: Duration,
    pub retained_lines: usize,
}

impl SessionOptions {
    pub const fn from_settings(settings: &Settings, dry_run: bool) -> Self {
        Self {
            dry_run,
            grace_period: Duration::from_secs(settings.effective_grace_period_secs()),
            retained_lines: settings.effective_retained_lines(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            grace_period: Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS),
            retained_lines: DEFAULT_RETAINED_LINES,
        }
    }
}

/// A session rejected by validation. Its handle is already in `Invalid`.
#[derive(Debug)]
pub struct InvalidSession {
    pub handle: SessionHandle,
    pub errors: Vec<ValidationError>,
}

/// A validated session waiting to run.
pub struct ExecutionSession {
    shared: Arc<SessionShared>,
    command: Command,
    tool: Tool,
    options: SessionOptions,
}

impl ExecutionSession {
    /// Build the command for `config`. Validation errors leave the session
    /// in `Invalid` and nothing is ever started for it.
    pub fn prepare(config: &OperationConfig, options: SessionOptions) -> Result<Self, InvalidSession> {
        let kind = config.kind();

        match build(config).into_result() {
            Ok(command) => {
                let shared = Arc::new(SessionShared::new(
                    kind,
                    options.dry_run,
                    command.display(),
                    options.retained_lines,
                ));
                shared.transition(SessionState::Building);
                Ok(Self {
                    shared,
                    command,
                    tool: Tool::for_kind(kind),
                    options,
                })
            }
            Err(errors) => {
                let shared = Arc::new(SessionShared::new(
                    kind,
                    options.dry_run,
                    String::new(),
                    options.retained_lines,
                ));
                shared.transition(SessionState::Building);
                info!(session = %shared.id(), %kind, errors = errors.len(), "Configuration rejected");
                shared.transition(SessionState::Invalid);
                Err(InvalidSession {
                    handle: SessionHandle::new(shared),
                    errors,
                })
            }
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(Arc::clone(&self.shared))
    }

    pub(crate) const fn shared(&self) -> &Arc<SessionShared> {
        &self.shared
    }

    /// Drive the session to a terminal state and return its outcome.
    ///
    /// `override_path` is the user's configured executable for this tool.
    pub async fn run(
        self,
        resolver: &dyn ExecutableResolver,
        runner: &dyn ProcessRunner,
        sink: &dyn OutputSink,
        override_path: Option<&Path>,
    ) -> ExitOutcome {
        let shared = &self.shared;

        if self.options.dry_run {
            shared.emit(sink, OutputEvent::line(0, StreamChannel::Engine, self.command.display()));
            shared.finish(sink, 1, ExitOutcome::DryRun);
            return ExitOutcome::DryRun;
        }

        shared.transition(SessionState::Launched);

        if shared.cancel_token().is_cancelled() {
            shared.finish(sink, 0, ExitOutcome::Cancelled);
            return ExitOutcome::Cancelled;
        }

        let program = match resolver.resolve(self.tool, override_path) {
            Ok(path) => path,
            Err(e) => {
                let outcome = ExitOutcome::launch_failed(LaunchFailure::ExecutableNotFound(e));
                shared.finish(sink, 0, outcome.clone());
                return outcome;
            }
        };

        let resolved = self.command.with_program(&program);
        let mut run = runner.start(LaunchSpec {
            program,
            args: resolved.argv(),
            first_sequence: 1,
            grace_period: self.options.grace_period,
            cancel: shared.cancel_token(),
        });

        if run.pid().is_some() {
            shared.emit(sink, OutputEvent::line(0, StreamChannel::Engine, resolved.display()));
            shared.transition(SessionState::Running);
        }

        let mut next_sequence = 1;
        while let Some(event) = run.next_event().await {
            next_sequence = event.sequence + 1;
            if let Some(outcome) = event.outcome().cloned() {
                let outcome = settle(shared, outcome);
                shared.finish(sink, event.sequence, outcome.clone());
                return outcome;
            }
            shared.emit(sink, event);
        }

        // Runner went away without reporting.
        let outcome = ExitOutcome::Failed { code: None };
        shared.finish(sink, next_sequence, outcome.clone());
        outcome
    }
}

/// Make a runner-reported outcome reachable from the current state, so
/// that `finish` always lands in a terminal state.
fn settle(shared: &SessionShared, outcome: ExitOutcome) -> ExitOutcome {
    match (shared.state(), &outcome) {
        // A clean exit means the process ran, even if no pid was reported.
        (SessionState::Launched, ExitOutcome::Succeeded | ExitOutcome::DryRun) => {
            shared.transition(SessionState::Running);
            outcome
        }
        (SessionState::Running, ExitOutcome::LaunchFailed { failure }) => {
            warn!(session = %shared.id(), %failure, "Launch failure reported after start");
            ExitOutcome::Failed { code: None }
        }
        _ => outcome,
    }
}

impl std::fmt::Debug for ExecutionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSession")
            .field("id", &self.shared.id())
            .field("command", &self.command)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
