//! Options for a downloader run.

use serde::{Deserialize, Serialize};

use super::secret::Secret;

/// Default name of the session cookie the downloader authenticates with.
pub const DEFAULT_COOKIE_NAME: &str = "substack.sid";

/// Directory name the downloader uses for images when none is given.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Directory name the downloader uses for attachments when none is given.
pub const DEFAULT_FILES_DIR: &str = "files";

/// Post format written by the downloader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Text,
}

impl OutputFormat {
    /// Value passed to the downloader's `-f` flag.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }

    /// Human-readable label, e.g. for a format picker.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown (.md)",
            Self::Html => "HTML (.html)",
            Self::Text => "Plain Text (.txt)",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "txt" | "text" => Ok(Self::Text),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Image download quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Low,
    Medium,
    High,
}

impl ImageQuality {
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for ImageQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown image quality: {other}")),
        }
    }
}

/// Publication date window, as entered (`YYYY-MM-DD`).
///
/// Either bound may be absent. Format and ordering are checked by the
/// argument builder, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub quality: ImageQuality,
    pub directory: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            quality: ImageQuality::default(),
            directory: DEFAULT_IMAGES_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentOptions {
    /// Comma separated extension filter, e.g. `pdf,docx`. Empty means all.
    pub extensions: String,
    pub directory: String,
}

impl Default for AttachmentOptions {
    fn default() -> Self {
        Self {
            extensions: String::new(),
            directory: DEFAULT_FILES_DIR.to_string(),
        }
    }
}

/// Everything the user chose for one downloader run.
///
/// Text fields hold what was typed, untrimmed; the argument builder is the
/// single place that trims and validates them. The cookie value is skipped
/// by serde so a persisted configuration never carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Publication URL, e.g. `https://example.substack.com/`.
    pub url: String,
    /// Output directory.
    pub destination: String,
    pub format: OutputFormat,
    pub date_range: Option<DateRange>,
    pub images: Option<ImageOptions>,
    pub attachments: Option<AttachmentOptions>,
    pub add_source_url: bool,
    pub create_archive: bool,
    /// Requests per second, as entered. `None` or blank uses the tool default.
    pub rate_limit: Option<String>,
    pub verbose: bool,
    /// Ask the downloader itself to only list what it would fetch (`-d`).
    pub tool_dry_run: bool,
    pub cookie_name: String,
    #[serde(skip)]
    pub cookie_value: Option<Secret>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            destination: String::new(),
            format: OutputFormat::default(),
            date_range: None,
            images: None,
            attachments: None,
            add_source_url: true,
            create_archive: false,
            rate_limit: None,
            verbose: false,
            tool_dry_run: false,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_value: None,
        }
    }
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, after: Option<&str>, before: Option<&str>) -> Self {
        self.date_range = Some(DateRange {
            after: after.map(str::to_string),
            before: before.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn with_images(mut self, images: ImageOptions) -> Self {
        self.images = Some(images);
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: AttachmentOptions) -> Self {
        self.attachments = Some(attachments);
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate: impl Into<String>) -> Self {
        self.rate_limit = Some(rate.into());
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: Secret) -> Self {
        self.cookie_name = name.into();
        self.cookie_value = Some(value);
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn with_tool_dry_run(mut self, enabled: bool) -> Self {
        self.tool_dry_run = enabled;
        self
    }
}
