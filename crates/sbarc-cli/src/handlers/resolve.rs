//! Resolve handler: show which executable a run would use.

use anyhow::Result;
use sbarc_core::ports::{ExecutableResolver, Tool};

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(ctx: &CliContext, tool: Tool) -> Result<()> {
    let settings = ctx.settings();
    let path = ctx
        .resolver
        .resolve(tool, settings.override_for(tool))
        .map_err(|e| CliError::Unavailable(e.to_string()))?;
    println!("{tool}: {}", path.display());
    Ok(())
}
