//! Root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Drive sbstck-dl and pandoc to archive Substack newsletters.
#[derive(Debug, Parser)]
#[command(name = "sbarc")]
#[command(about = "Download Substack newsletters and bind them into an ePub")]
#[command(version)]
pub struct Cli {
    /// Print the command that would run, without running it
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
