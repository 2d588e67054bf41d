//! Command-line front end for sbarc.
//!
//! Parses arguments, loads settings, wires the runtime together and streams
//! session output to the terminal.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Only the binary installs the subscriber
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, bootstrap};
pub use commands::{Commands, ConvertArgs, DownloadArgs, PreviewCommand, SettingsCommand};
pub use error::{CliError, outcome_exit_code};
pub use parser::Cli;
pub use presentation::ConsoleSink;
