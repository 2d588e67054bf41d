//! Output events, exit outcomes and session states.
//!
//! These are the only values that cross from a running session back to the
//! caller. Everything is serde-serializable so an adapter can forward it to
//! a frontend unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::OperationKind;
use crate::ports::ResolveError;

/// Identity of one execution session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where a line of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamChannel {
    Stdout,
    Stderr,
    /// Lines produced by the engine itself, such as the command echo.
    Engine,
}

impl StreamChannel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Engine => "engine",
        }
    }
}

/// Why a process never started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchFailure {
    /// The resolver could not find a runnable program.
    ExecutableNotFound(ResolveError),
    /// The OS refused to spawn the program (vanished, permissions, ...).
    Spawn { program: String, reason: String },
}

impl fmt::Display for LaunchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutableNotFound(err) => fmt::Display::fmt(err, f),
            Self::Spawn { program, reason } => write!(f, "failed to start {program}: {reason}"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ExitOutcome {
    /// Exit code 0.
    Succeeded,
    /// Non-zero exit. `code` is `None` when a signal we did not send ended it.
    Failed { code: Option<i32> },
    /// The caller cancelled before the process exited on its own.
    Cancelled,
    /// No process ran.
    LaunchFailed { failure: LaunchFailure },
    /// Dry run: the command was built and shown, nothing was executed.
    DryRun,
}

impl ExitOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::DryRun)
    }

    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Succeeded => Some(0),
            Self::Failed { code } => *code,
            _ => None,
        }
    }

    pub const fn launch_failed(failure: LaunchFailure) -> Self {
        Self::LaunchFailed { failure }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("completed successfully (exit code 0)"),
            Self::Failed { code: Some(code) } => write!(f, "process exited with code {code}"),
            Self::Failed { code: None } => f.write_str("process terminated by a signal"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::LaunchFailed { failure } => write!(f, "launch failed: {failure}"),
            Self::DryRun => f.write_str("dry run, nothing executed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutputPayload {
    Line { channel: StreamChannel, text: String },
    Terminal { outcome: ExitOutcome },
}

/// One unit of session output. Sequence numbers are strictly increasing
/// within a session and the terminal event is always last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: OutputPayload,
}

impl OutputEvent {
    pub fn line(sequence: u64, channel: StreamChannel, text: impl Into<String>) -> Self {
        Self {
            sequence,
            timestamp: Utc::now(),
            payload: OutputPayload::Line {
                channel,
                text: text.into(),
            },
        }
    }

    pub fn terminal(sequence: u64, outcome: ExitOutcome) -> Self {
        Self {
            sequence,
            timestamp: Utc::now(),
            payload: OutputPayload::Terminal { outcome },
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self.payload, OutputPayload::Terminal { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            OutputPayload::Line { text, .. } => Some(text),
            OutputPayload::Terminal { .. } => None,
        }
    }

    pub const fn outcome(&self) -> Option<&ExitOutcome> {
        match &self.payload {
            OutputPayload::Terminal { outcome } => Some(outcome),
            OutputPayload::Line { .. } => None,
        }
    }
}

/// Lifecycle of an execution session.
///
/// ```text
/// Idle → Building → Launched → Running → Completed | Failed | Cancelled
///            │          └──────────────→ LaunchError | Failed | Cancelled
///            ├ (dry run) → Completed
///            └ Invalid
/// ```
///
/// `Launched → Failed` covers a run that ended before it was ever seen
/// running, e.g. a runner whose output closed without an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Building,
    /// Validation failed; no process was ever started.
    Invalid,
    Launched,
    Running,
    Completed,
    Failed,
    Cancelled,
    LaunchError,
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::Completed | Self::Failed | Self::Cancelled | Self::LaunchError
        )
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Building)
                | (Self::Building, Self::Invalid | Self::Launched | Self::Completed)
                | (
                    Self::Launched,
                    Self::Running | Self::LaunchError | Self::Failed | Self::Cancelled
                )
                | (
                    Self::Running,
                    Self::Completed | Self::Failed | Self::Cancelled
                )
        )
    }

    /// Terminal state recorded for an outcome.
    pub const fn for_outcome(outcome: &ExitOutcome) -> Self {
        match outcome {
            ExitOutcome::Succeeded | ExitOutcome::DryRun => Self::Completed,
            ExitOutcome::Failed { .. } => Self::Failed,
            ExitOutcome::Cancelled => Self::Cancelled,
            ExitOutcome::LaunchFailed { .. } => Self::LaunchError,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Invalid => "invalid",
            Self::Launched => "launched",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::LaunchError => "launch error",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of a session for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub kind: OperationKind,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    /// Redacted command line.
    pub command: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ExitOutcome>,
}
