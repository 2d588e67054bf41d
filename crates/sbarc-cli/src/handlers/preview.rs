//! Preview handler: print the redacted command line for a run.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::PreviewCommand;
use crate::error::CliError;

pub fn execute(ctx: &CliContext, command: PreviewCommand) -> Result<()> {
    let config = command.into_config()?;
    let line = ctx.supervisor.preview(&config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        CliError::Arguments(messages.join("; "))
    })?;
    println!("{line}");
    Ok(())
}
