//! Core types for sbarc: run configurations, the argument builder, output
//! events and the ports the runtime implements.
//!
//! Nothing in this crate spawns processes or touches `PATH`. Everything
//! except [`settings::SettingsStore`] and [`paths`] is pure.

#![deny(unused_crate_dependencies)]

pub mod args;
pub mod command;
pub mod config;
pub mod events;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use args::{BuildOutput, ValidationError, build, build_convert, build_download, preview};
pub use command::{Arg, Command};
pub use config::{
    AttachmentOptions, ConvertConfig, DEFAULT_AUTHOR, DEFAULT_COOKIE_NAME, DEFAULT_FILES_DIR,
    DEFAULT_IMAGES_DIR, DEFAULT_TITLE, DateRange, DownloadConfig, ImageOptions, ImageQuality,
    OperationConfig, OperationKind, OutputFormat, REDACTED_PLACEHOLDER, Secret,
    collect_markdown_sources,
};
pub use events::{
    ExitOutcome, LaunchFailure, OutputEvent, OutputPayload, SessionId, SessionSnapshot,
    SessionState, StreamChannel,
};
pub use paths::{CONFIG_DIR_ENV, PathError, config_root, ensure_directory, settings_path};
pub use ports::{ExecutableResolver, NoopSink, OutputSink, ResolveError, Tool};
pub use settings::{
    DEFAULT_GRACE_PERIOD_SECS, DEFAULT_RETAINED_LINES, Settings, SettingsError, SettingsStore,
    SettingsStoreError, validate_settings,
};

// Only the integration tests use proptest
#[cfg(test)]
use proptest as _;
