//! Command handlers.
//!
//! Each handler receives the composed [`CliContext`](crate::CliContext)
//! and does one command's work.

pub mod preview;
pub mod resolve;
pub mod run;
pub mod settings;
