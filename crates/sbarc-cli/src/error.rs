//! CLI error type and exit code mapping.

use sbarc_core::{ExitOutcome, LaunchFailure, PathError, SettingsStoreError};
use sbarc_runtime::LaunchError;
use thiserror::Error;

/// Exit code for a run the user interrupted (128 + SIGINT).
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or run configuration error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings could not be located, read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required tool is not installed or not runnable.
    #[error("{0}")]
    Unavailable(String),

    /// Process or session error.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to an exit code, following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,    // EX_USAGE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71,     // EX_OSERR
        }
    }
}

impl From<LaunchError> for CliError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::Invalid(_) => Self::Arguments(err.to_string()),
            LaunchError::SessionAlreadyRunning(_) => Self::Process(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SettingsStoreError> for CliError {
    fn from(err: SettingsStoreError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Exit code for a finished session.
///
/// A tool's own non-zero code is passed through unchanged.
pub const fn outcome_exit_code(outcome: &ExitOutcome) -> i32 {
    match outcome {
        ExitOutcome::Succeeded | ExitOutcome::DryRun => 0,
        ExitOutcome::Failed { code: Some(code) } => *code,
        ExitOutcome::Failed { code: None } => 1,
        ExitOutcome::Cancelled => EXIT_CANCELLED,
        ExitOutcome::LaunchFailed {
            failure: LaunchFailure::ExecutableNotFound(_),
        } => 69,
        ExitOutcome::LaunchFailed {
            failure: LaunchFailure::Spawn { .. },
        } => 71,
    }
}
