//! Per-operation configuration value objects.
//!
//! A configuration is an immutable description of one requested run. The
//! excluded UI layer fills it in; the argument builder turns it into a
//! [`Command`](crate::command::Command).

mod convert;
mod download;
mod secret;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use convert::{ConvertConfig, DEFAULT_AUTHOR, DEFAULT_TITLE, collect_markdown_sources};
pub use download::{
    AttachmentOptions, DEFAULT_COOKIE_NAME, DEFAULT_FILES_DIR, DEFAULT_IMAGES_DIR, DateRange,
    DownloadConfig, ImageOptions, ImageQuality, OutputFormat,
};
pub use secret::{REDACTED_PLACEHOLDER, Secret};

/// Which external tool a run drives. At most one session per kind is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Download,
    Convert,
}

impl OperationKind {
    pub const ALL: [Self; 2] = [Self::Download, Self::Convert];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration for either kind of run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OperationConfig {
    Download(DownloadConfig),
    Convert(ConvertConfig),
}

impl OperationConfig {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Download(_) => OperationKind::Download,
            Self::Convert(_) => OperationKind::Convert,
        }
    }
}

impl From<DownloadConfig> for OperationConfig {
    fn from(config: DownloadConfig) -> Self {
        Self::Download(config)
    }
}

impl From<ConvertConfig> for OperationConfig {
    fn from(config: ConvertConfig) -> Self {
        Self::Convert(config)
    }
}
