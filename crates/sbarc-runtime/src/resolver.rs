//! Host implementation of the executable resolver port.
//!
//! Resolution order for a tool:
//! 1. the explicit override path from settings
//! 2. the tool's environment variable override
//! 3. a `PATH` search for the canonical name
//! 4. well-known install directories that are often missing from `PATH`
//!    when the app is launched from a desktop session
//!
//! An override that is set but unusable is an error; it never falls
//! through to the search.

use sbarc_core::ports::{ExecutableResolver, ResolveError, Tool};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

type EnvLookup = Box<dyn Fn(&str) -> Option<OsString> + Send + Sync>;

/// Resolves tools against the host filesystem.
pub struct SystemResolver {
    env: EnvLookup,
    search_path: Option<OsString>,
    well_known_dirs: Vec<PathBuf>,
}

impl SystemResolver {
    /// Resolver using the process environment and the platform's usual
    /// install directories.
    pub fn new() -> Self {
        Self {
            env: Box::new(|name| env::var_os(name)),
            search_path: None,
            well_known_dirs: default_well_known_dirs(),
        }
    }

    /// Search this `PATH`-style list instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Replace the fallback install directories.
    #[must_use]
    pub fn with_well_known_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.well_known_dirs = dirs;
        self
    }

    /// Read override variables through `lookup` instead of the process env.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<OsString> + Send + Sync + 'static) -> Self {
        self.env = Box::new(lookup);
        self
    }

    fn path_var(&self) -> Option<OsString> {
        self.search_path
            .clone()
            .or_else(|| (self.env)("PATH"))
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver")
            .field("search_path", &self.search_path)
            .field("well_known_dirs", &self.well_known_dirs)
            .finish_non_exhaustive()
    }
}

impl ExecutableResolver for SystemResolver {
    fn resolve(&self, tool: Tool, override_path: Option<&Path>) -> Result<PathBuf, ResolveError> {
        if let Some(path) = override_path {
            debug!(%tool, path = %path.display(), "Checking configured executable");
            return check_override(tool, path);
        }

        if let Some(value) = (self.env)(tool.env_override_var()).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(value);
            debug!(%tool, path = %path.display(), var = tool.env_override_var(), "Checking env override");
            return check_override(tool, &path);
        }

        let name = executable_name(tool);
        let mut attempted = Vec::new();

        if let Some(path_var) = self.path_var() {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if let Ok(found) = which::which_in(&name, Some(&path_var), cwd) {
                debug!(%tool, path = %found.display(), "Found on PATH");
                return Ok(found);
            }
            attempted.extend(env::split_paths(&path_var).map(|dir| dir.join(&name)));
        }

        for dir in &self.well_known_dirs {
            let candidate = dir.join(&name);
            if is_executable_file(&candidate) {
                debug!(%tool, path = %candidate.display(), "Found in well-known directory");
                return Ok(candidate);
            }
            attempted.push(candidate);
        }

        debug!(%tool, attempts = attempted.len(), "Executable not found");
        Err(ResolveError::NotFound { tool, attempted })
    }
}

fn check_override(tool: Tool, path: &Path) -> Result<PathBuf, ResolveError> {
    let invalid = |reason: &str| ResolveError::OverrideInvalid {
        tool,
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let metadata = fs::metadata(path).map_err(|_| invalid("does not exist"))?;
    if !metadata.is_file() {
        return Err(invalid("not a file"));
    }
    if !is_executable_file(path) {
        return Err(invalid("not executable"));
    }
    Ok(path.to_path_buf())
}

fn executable_name(tool: Tool) -> String {
    format!("{}{}", tool.canonical_name(), env::consts::EXE_SUFFIX)
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file())
}

fn default_well_known_dirs() -> Vec<PathBuf> {
    let mut dirs_out = Vec::new();

    if let Some(home) = dirs::home_dir() {
        dirs_out.push(home.join(".local").join("bin"));
        dirs_out.push(home.join("go").join("bin"));
        dirs_out.push(home.join(".cabal").join("bin"));
    }

    #[cfg(unix)]
    {
        dirs_out.push(PathBuf::from("/usr/local/bin"));
        dirs_out.push(PathBuf::from("/opt/homebrew/bin"));
        dirs_out.push(PathBuf::from("/usr/bin"));
    }

    #[cfg(windows)]
    {
        dirs_out.push(PathBuf::from(r"C:\Program Files\Pandoc"));
        if let Some(local) = dirs::data_local_dir() {
            dirs_out.push(local.join("Pandoc"));
        }
    }

    dirs_out
}
