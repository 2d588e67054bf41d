//! Settings domain types, validation and JSON persistence.
//!
//! Settings hold only non-secret values: executable overrides and runtime
//! tuning. Session cookies never pass through here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::paths::{self, PathError};
use crate::ports::Tool;

/// Seconds a cancelled process gets between SIGTERM and SIGKILL.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;

/// Output lines kept per session for late viewers.
pub const DEFAULT_RETAINED_LINES: usize = 2000;

const MAX_GRACE_PERIOD_SECS: u64 = 300;

/// Application settings structure.
///
/// All fields are optional so files written by older versions still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Explicit path to `sbstck-dl`.
    pub downloader_path: Option<String>,

    /// Explicit path to `pandoc`.
    pub converter_path: Option<String>,

    /// Grace period before a cancelled process is force-killed.
    pub grace_period_secs: Option<u64>,

    /// Size of each session's output ring buffer.
    pub retained_lines: Option<usize>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            downloader_path: None,
            converter_path: None,
            grace_period_secs: Some(DEFAULT_GRACE_PERIOD_SECS),
            retained_lines: Some(DEFAULT_RETAINED_LINES),
        }
    }

    /// The user's explicit executable path for `tool`, if set.
    pub fn override_for(&self, tool: Tool) -> Option<&Path> {
        let raw = match tool {
            Tool::Downloader => self.downloader_path.as_deref(),
            Tool::Converter => self.converter_path.as_deref(),
        };
        raw.map(str::trim).filter(|p| !p.is_empty()).map(Path::new)
    }

    /// Set or clear the executable override for `tool`.
    pub fn set_override(&mut self, tool: Tool, path: Option<String>) {
        let slot = match tool {
            Tool::Downloader => &mut self.downloader_path,
            Tool::Converter => &mut self.converter_path,
        };
        *slot = path;
    }

    #[must_use]
    pub const fn effective_grace_period_secs(&self) -> u64 {
        match self.grace_period_secs {
            Some(secs) => secs,
            None => DEFAULT_GRACE_PERIOD_SECS,
        }
    }

    #[must_use]
    pub const fn effective_retained_lines(&self) -> usize {
        match self.retained_lines {
            Some(lines) => lines,
            None => DEFAULT_RETAINED_LINES,
        }
    }

    /// Fill unset fields from `defaults`, keeping everything already set.
    fn fill_from(&mut self, defaults: &Self) {
        if self.grace_period_secs.is_none() {
            self.grace_period_secs = defaults.grace_period_secs;
        }
        if self.retained_lines.is_none() {
            self.retained_lines = defaults.retained_lines;
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Grace period must be at most {MAX_GRACE_PERIOD_SECS} seconds, got {0}")]
    InvalidGracePeriod(u64),

    #[error("Retained output lines must be at least 1")]
    InvalidRetainedLines,

    #[error("Executable path for {0} cannot be empty")]
    EmptyExecutablePath(Tool),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(secs) = settings.grace_period_secs
        && secs > MAX_GRACE_PERIOD_SECS
    {
        return Err(SettingsError::InvalidGracePeriod(secs));
    }

    if settings.retained_lines == Some(0) {
        return Err(SettingsError::InvalidRetainedLines);
    }

    for tool in Tool::ALL {
        let raw = match tool {
            Tool::Downloader => settings.downloader_path.as_deref(),
            Tool::Converter => settings.converter_path.as_deref(),
        };
        if raw.is_some_and(|p| p.trim().is_empty()) {
            return Err(SettingsError::EmptyExecutablePath(tool));
        }
    }

    Ok(())
}

/// Errors from loading or saving the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsStoreError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Invalid(#[from] SettingsError),

    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON file persistence for [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default location (see [`paths::settings_path`]).
    pub fn open_default() -> Result<Self, PathError> {
        Ok(Self::at(paths::settings_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file is missing,
    /// unreadable or corrupt. Keys missing from the file take default values.
    pub fn load(&self) -> Settings {
        let defaults = Settings::with_defaults();

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return defaults;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read settings, using defaults");
                return defaults;
            }
        };

        let mut settings = match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt settings file, using defaults");
                return defaults;
            }
        };
        settings.fill_from(&defaults);

        if let Err(e) = validate_settings(&settings) {
            warn!(path = %self.path.display(), error = %e, "Invalid settings, using defaults");
            return defaults;
        }

        settings
    }

    /// Validate and write settings, creating the parent directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        validate_settings(settings)?;

        if let Some(parent) = self.path.parent() {
            paths::ensure_directory(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).map_err(|source| SettingsStoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.grace_period_secs, Some(5));
        assert_eq!(settings.retained_lines, Some(2000));
        assert!(settings.override_for(Tool::Converter).is_none());
    }

    #[test]
    fn test_override_for_ignores_blank() {
        let mut settings = Settings::with_defaults();
        settings.set_override(Tool::Downloader, Some("   ".into()));
        assert!(settings.override_for(Tool::Downloader).is_none());

        settings.set_override(Tool::Converter, Some("/opt/pandoc/bin/pandoc".into()));
        assert_eq!(
            settings.override_for(Tool::Converter),
            Some(Path::new("/opt/pandoc/bin/pandoc"))
        );
    }

    #[test]
    fn test_validate_settings() {
        assert!(validate_settings(&Settings::with_defaults()).is_ok());

        let settings = Settings {
            grace_period_secs: Some(1000),
            ..Settings::with_defaults()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidGracePeriod(1000))
        );

        let settings = Settings {
            retained_lines: Some(0),
            ..Settings::with_defaults()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidRetainedLines)
        );

        let settings = Settings {
            downloader_path: Some(String::new()),
            ..Settings::with_defaults()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptyExecutablePath(Tool::Downloader))
        );
    }

    #[test]
    fn test_store_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.json"));
        assert_eq!(store.load(), Settings::with_defaults());
    }

    #[test]
    fn test_store_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SettingsStore::at(&path).load(), Settings::with_defaults());
    }

    #[test]
    fn test_store_merges_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"converter_path":"/usr/bin/pandoc"}"#).unwrap();

        let settings = SettingsStore::at(&path).load();
        assert_eq!(settings.converter_path.as_deref(), Some("/usr/bin/pandoc"));
        assert_eq!(settings.grace_period_secs, Some(DEFAULT_GRACE_PERIOD_SECS));
        assert_eq!(settings.retained_lines, Some(DEFAULT_RETAINED_LINES));
    }

    #[test]
    fn test_store_round_trip_creates_parent() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("config.json"));

        let mut settings = Settings::with_defaults();
        settings.set_override(Tool::Downloader, Some("/home/me/bin/sbstck-dl".into()));
        store.save(&settings).unwrap();

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_store_rejects_invalid() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.json"));
        let settings = Settings {
            retained_lines: Some(0),
            ..Settings::default()
        };
        assert!(matches!(
            store.save(&settings),
            Err(SettingsStoreError::Invalid(_))
        ));
        assert!(!store.path().exists());
    }
}
