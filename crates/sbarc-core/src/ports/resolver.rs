//! Executable resolver port.
//!
//! Locating a program touches the filesystem and the environment, so the
//! engine depends on this trait and the runtime crate supplies the
//! implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::OperationKind;

/// The external programs the engine knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// `sbstck-dl`, the newsletter downloader.
    Downloader,
    /// `pandoc`, the Markdown → ePub converter.
    Converter,
}

impl Tool {
    pub const ALL: [Self; 2] = [Self::Downloader, Self::Converter];

    /// Executable name searched for on `PATH`.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Downloader => "sbstck-dl",
            Self::Converter => "pandoc",
        }
    }

    /// Environment variable that overrides the search for this tool.
    pub const fn env_override_var(self) -> &'static str {
        match self {
            Self::Downloader => "SBARC_SBSTCK_DL_PATH",
            Self::Converter => "SBARC_PANDOC_PATH",
        }
    }

    pub const fn for_kind(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Download => Self::Downloader,
            OperationKind::Convert => Self::Converter,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sbstck-dl" | "downloader" | "download" => Ok(Self::Downloader),
            "pandoc" | "converter" | "convert" => Ok(Self::Converter),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

/// Why an executable could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolveError {
    /// An explicit path was configured but is unusable.
    #[error("configured path for {tool} is unusable: {path} ({reason})")]
    OverrideInvalid {
        tool: Tool,
        path: PathBuf,
        reason: String,
    },

    /// Nothing runnable was found in any searched location.
    #[error("{tool} not found; searched: {}", format_attempted(.attempted))]
    NotFound { tool: Tool, attempted: Vec<PathBuf> },
}

impl ResolveError {
    pub const fn tool(&self) -> Tool {
        match self {
            Self::OverrideInvalid { tool, .. } | Self::NotFound { tool, .. } => *tool,
        }
    }
}

fn format_attempted(attempted: &[PathBuf]) -> String {
    if attempted.is_empty() {
        return "(no search locations)".to_string();
    }
    attempted
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locates a runnable program for a tool.
///
/// `override_path` is the user's explicit setting, if any. Implementations
/// are stateless per call: settings may change between runs.
pub trait ExecutableResolver: Send + Sync {
    fn resolve(&self, tool: Tool, override_path: Option<&Path>) -> Result<PathBuf, ResolveError>;
}
