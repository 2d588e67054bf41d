//! Argument builder: configuration → command tokens.
//!
//! Building is pure. The same configuration always yields the same
//! [`Command`], and any validation error means no command at all. The
//! mapping tables in `download` and `convert` track the external tools'
//! argument vocabulary; they do not define it.

mod convert;
mod download;
mod validation;

pub use convert::build_convert;
pub use download::build_download;
pub use validation::ValidationError;

use crate::command::Command;
use crate::config::OperationConfig;

/// Result of a build: either a command or the full list of problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub command: Option<Command>,
    pub errors: Vec<ValidationError>,
}

impl BuildOutput {
    pub fn into_result(self) -> Result<Command, Vec<ValidationError>> {
        match self.command {
            Some(command) if self.errors.is_empty() => Ok(command),
            _ => Err(self.errors),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.command.is_some()
    }
}

impl From<Result<Command, Vec<ValidationError>>> for BuildOutput {
    fn from(result: Result<Command, Vec<ValidationError>>) -> Self {
        match result {
            Ok(command) => Self {
                command: Some(command),
                errors: Vec::new(),
            },
            Err(errors) => Self {
                command: None,
                errors,
            },
        }
    }
}

/// Build the command for any configuration.
pub fn build(config: &OperationConfig) -> BuildOutput {
    match config {
        OperationConfig::Download(c) => build_download(c),
        OperationConfig::Convert(c) => build_convert(c),
    }
    .into()
}

/// Redacted one-line rendering of the command a configuration would run.
pub fn preview(config: &OperationConfig) -> Result<String, Vec<ValidationError>> {
    build(config).into_result().map(|cmd| cmd.display())
}
