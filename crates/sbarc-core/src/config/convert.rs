//! Options for a converter (Markdown → ePub) run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_TITLE: &str = "Substack Archive";
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Everything the user chose for one conversion.
///
/// `inputs` is gathered by the caller (see [`collect_markdown_sources`])
/// so that building the command stays free of filesystem access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub source_dir: String,
    pub inputs: Vec<PathBuf>,
    /// Target `.epub` file.
    pub output: String,
    /// Blank falls back to [`DEFAULT_TITLE`].
    pub title: String,
    /// Blank falls back to [`DEFAULT_AUTHOR`].
    pub author: String,
    pub table_of_contents: bool,
    /// Chapter split level, as entered. `None` or blank means 1.
    pub split_level: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source_dir: String::new(),
            inputs: Vec::new(),
            output: String::new(),
            title: String::new(),
            author: String::new(),
            table_of_contents: true,
            split_level: None,
        }
    }
}

impl ConvertConfig {
    pub fn new(
        source_dir: impl Into<String>,
        inputs: Vec<PathBuf>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            inputs,
            output: output.into(),
            ..Self::default()
        }
    }

    /// Build a configuration whose inputs are the Markdown posts in `dir`.
    pub fn from_source_dir(dir: impl AsRef<Path>, output: impl Into<String>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let inputs = collect_markdown_sources(dir)?;
        Ok(Self::new(dir.to_string_lossy(), inputs, output))
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub const fn with_table_of_contents(mut self, enabled: bool) -> Self {
        self.table_of_contents = enabled;
        self
    }

    #[must_use]
    pub fn with_split_level(mut self, level: impl Into<String>) -> Self {
        self.split_level = Some(level.into());
        self
    }
}

/// List the `.md` files directly inside `dir`, sorted by file name.
///
/// `index.md` is skipped: the downloader writes it as a table of contents
/// and it would otherwise become the first chapter. Matching is
/// case-insensitive.
pub fn collect_markdown_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.ends_with(".md") && lower != "index.md"
        })
        .collect();

    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}
