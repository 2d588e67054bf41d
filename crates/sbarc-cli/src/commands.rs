//! Subcommand definitions and their translation into run configurations.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use sbarc_core::ports::Tool;
use sbarc_core::{
    AttachmentOptions, ConvertConfig, DEFAULT_AUTHOR, DEFAULT_COOKIE_NAME, DEFAULT_FILES_DIR,
    DEFAULT_IMAGES_DIR, DEFAULT_TITLE, DateRange, DownloadConfig, ImageOptions, ImageQuality,
    OperationConfig, OutputFormat, Secret,
};

use crate::error::CliError;

/// Available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download a newsletter archive with sbstck-dl
    Download(DownloadArgs),

    /// Bind downloaded Markdown posts into an ePub with pandoc
    Convert(ConvertArgs),

    /// Show the command a run would execute, with secrets masked
    Preview {
        #[command(subcommand)]
        command: PreviewCommand,
    },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Show which executable would be used for a tool
    Resolve {
        /// sbstck-dl or pandoc
        tool: Tool,
    },
}

#[derive(Debug, Subcommand)]
pub enum PreviewCommand {
    Download(DownloadArgs),
    Convert(ConvertArgs),
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings as JSON
    Show,

    /// Use an explicit executable for a tool
    SetPath {
        /// sbstck-dl or pandoc
        tool: Tool,
        path: String,
    },

    /// Go back to searching for a tool
    ClearPath { tool: Tool },

    /// Seconds a cancelled tool gets before it is killed
    SetGracePeriod { seconds: u64 },
}

/// Arguments for an sbstck-dl run.
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Publication URL, e.g. https://example.substack.com
    pub url: String,

    /// Directory the posts are written to
    #[arg(short = 'o', long = "output")]
    pub output: String,

    /// Post format: md, html or txt
    #[arg(short = 'f', long, default_value = "md")]
    pub format: OutputFormat,

    /// Only posts published after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<String>,

    /// Only posts published before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<String>,

    /// Download images referenced by posts
    #[arg(long)]
    pub images: bool,

    #[arg(long, default_value = "low", requires = "images")]
    pub image_quality: ImageQuality,

    #[arg(long, default_value = DEFAULT_IMAGES_DIR, requires = "images")]
    pub images_dir: String,

    /// Download file attachments
    #[arg(long)]
    pub files: bool,

    /// Comma separated extensions to keep, e.g. pdf,docx
    #[arg(long, default_value = "", requires = "files")]
    pub file_extensions: String,

    #[arg(long, default_value = DEFAULT_FILES_DIR, requires = "files")]
    pub files_dir: String,

    /// Do not append the source URL to each post
    #[arg(long)]
    pub no_source_url: bool,

    /// Write an archive index page
    #[arg(long)]
    pub archive: bool,

    /// Requests per second
    #[arg(long)]
    pub rate: Option<String>,

    /// Ask sbstck-dl for verbose output
    #[arg(long)]
    pub tool_verbose: bool,

    /// Let sbstck-dl list what it would fetch without writing files
    #[arg(long)]
    pub tool_dry_run: bool,

    #[arg(long, default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// Session cookie for subscriber-only posts
    #[arg(long, env = "SBARC_COOKIE", hide_env_values = true)]
    pub cookie_value: Option<String>,
}

impl DownloadArgs {
    pub fn into_config(self) -> DownloadConfig {
        let mut config = DownloadConfig::new(self.url, self.output).with_format(self.format);
        if self.after.is_some() || self.before.is_some() {
            config.date_range = Some(DateRange {
                after: self.after,
                before: self.before,
            });
        }
        if self.images {
            config = config.with_images(ImageOptions {
                quality: self.image_quality,
                directory: self.images_dir,
            });
        }
        if self.files {
            config = config.with_attachments(AttachmentOptions {
                extensions: self.file_extensions,
                directory: self.files_dir,
            });
        }
        if let Some(rate) = self.rate {
            config = config.with_rate_limit(rate);
        }
        config.add_source_url = !self.no_source_url;
        config.create_archive = self.archive;
        config.cookie_name = self.cookie_name;
        config.cookie_value = self.cookie_value.map(Secret::new);
        config
            .with_verbose(self.tool_verbose)
            .with_tool_dry_run(self.tool_dry_run)
    }
}

/// Arguments for a pandoc run.
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Directory holding the downloaded Markdown posts
    pub source_dir: PathBuf,

    /// Target .epub file
    #[arg(short = 'o', long = "output")]
    pub output: String,

    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    #[arg(long, default_value = DEFAULT_AUTHOR)]
    pub author: String,

    /// Leave out the table of contents
    #[arg(long)]
    pub no_toc: bool,

    /// Heading level that starts a new chapter
    #[arg(long)]
    pub split_level: Option<String>,
}

impl ConvertArgs {
    /// Gathers the Markdown posts in the source directory.
    pub fn into_config(self) -> Result<ConvertConfig, CliError> {
        let config = ConvertConfig::from_source_dir(&self.source_dir, self.output).map_err(|e| {
            CliError::Io(format!("cannot read {}: {e}", self.source_dir.display()))
        })?;
        let config = config
            .with_title(self.title)
            .with_author(self.author)
            .with_table_of_contents(!self.no_toc);
        Ok(match self.split_level {
            Some(level) => config.with_split_level(level),
            None => config,
        })
    }
}

impl PreviewCommand {
    pub fn into_config(self) -> Result<OperationConfig, CliError> {
        Ok(match self {
            Self::Download(args) => args.into_config().into(),
            Self::Convert(args) => args.into_config()?.into(),
        })
    }
}
