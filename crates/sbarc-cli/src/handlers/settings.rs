//! Settings handler.

use std::path::Path;

use anyhow::Result;
use sbarc_core::ports::{ExecutableResolver, Tool};

use crate::bootstrap::CliContext;
use crate::commands::SettingsCommand;
use crate::error::CliError;

pub fn execute(ctx: &CliContext, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => show(ctx),
        SettingsCommand::SetPath { tool, path } => set_path(ctx, tool, &path),
        SettingsCommand::ClearPath { tool } => {
            let mut settings = ctx.settings();
            settings.set_override(tool, None);
            ctx.update_settings(settings)?;
            println!("✓ {tool} will be searched for on PATH.");
            Ok(())
        }
        SettingsCommand::SetGracePeriod { seconds } => {
            let mut settings = ctx.settings();
            settings.grace_period_secs = Some(seconds);
            ctx.update_settings(settings)?;
            println!("✓ Grace period set to {seconds}s.");
            Ok(())
        }
    }
}

fn show(ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings();
    println!("Settings file: {}", ctx.store.path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Only a path that currently resolves to a runnable file is saved.
fn set_path(ctx: &CliContext, tool: Tool, path: &str) -> Result<()> {
    let path = path.trim();
    let resolved = ctx
        .resolver
        .resolve(tool, Some(Path::new(path)))
        .map_err(|e| CliError::Unavailable(e.to_string()))?;

    let mut settings = ctx.settings();
    settings.set_override(tool, Some(path.to_string()));
    ctx.update_settings(settings)?;
    println!("✓ {tool} set to {}", resolved.display());
    Ok(())
}
