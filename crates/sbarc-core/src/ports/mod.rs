//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the engine expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod output_sink;
pub mod resolver;

pub use output_sink::{NoopSink, OutputSink};
pub use resolver::{ExecutableResolver, ResolveError, Tool};
