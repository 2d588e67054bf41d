//! Application path resolution.
//!
//! The only persisted file is the settings JSON. Its directory is the
//! platform config dir (`~/.config/sbarc` on Linux) unless
//! `SBARC_CONFIG_DIR` points elsewhere.

mod error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use error::PathError;

/// Environment variable that relocates the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SBARC_CONFIG_DIR";

const APP_DIR_NAME: &str = "sbarc";
const SETTINGS_FILE_NAME: &str = "config.json";

/// Directory holding sbarc's configuration.
pub fn config_root() -> Result<PathBuf, PathError> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if trimmed.is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(trimmed));
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(PathError::NoConfigDir)
}

/// Location of the settings file.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(config_root()?.join(SETTINGS_FILE_NAME))
}

/// Create `dir` (and parents) if needed.
pub fn ensure_directory(dir: &Path) -> Result<(), PathError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PathError::NotADirectory(dir.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| PathError::CreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}
