//! Process runtime and OS-level concerns for sbarc.
//!
//! Implements the ports from `sbarc-core` against the host: finding tool
//! executables, spawning and cancelling them, and supervising sessions.

#![deny(unused_crate_dependencies)]

pub mod process;
pub mod resolver;
pub mod session;
pub mod sinks;
pub mod supervisor;

pub use process::{DRAIN_TIMEOUT, LaunchSpec, ProcessRunner, RunHandle, TokioProcessRunner};
pub use resolver::SystemResolver;
pub use session::{ExecutionSession, InvalidSession, OutputBuffer, SessionHandle, SessionOptions};
pub use sinks::{ChannelSink, SessionEvent, TracingSink};
pub use supervisor::{LaunchError, LaunchOptions, SessionSupervisor};

// Dev-dependencies only exercised by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
