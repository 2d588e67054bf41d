//! Download and convert handler: launch a session and stream it to the
//! terminal until it ends.

use std::future::Future;
use std::io;

use anyhow::Result;
use sbarc_core::{ExitOutcome, OperationConfig};
use sbarc_runtime::{LaunchOptions, SessionHandle};
use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::{CliError, outcome_exit_code};
use crate::presentation::outcome_line;

/// Run `config` and return the process exit code for its outcome.
///
/// Ctrl+C cancels the session; the tool then gets the configured grace
/// period before it is killed.
pub async fn execute(ctx: &CliContext, config: OperationConfig, dry_run: bool) -> Result<i32> {
    let handle = ctx
        .supervisor
        .launch(&config, LaunchOptions { dry_run })
        .map_err(CliError::from)?;

    let outcome = wait_or_interrupt(&handle, tokio::signal::ctrl_c()).await;
    eprintln!("{}", outcome_line(handle.kind(), &outcome));
    Ok(outcome_exit_code(&outcome))
}

/// Wait for `handle` to finish, cancelling it if `interrupt` fires first.
pub async fn wait_or_interrupt<F>(handle: &SessionHandle, interrupt: F) -> ExitOutcome
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        _ = handle.wait() => {}
        Ok(()) = interrupt => {
            info!(session = %handle.id(), "Interrupted");
            eprintln!("Stopping {}...", handle.kind());
            handle.cancel();
            handle.wait().await;
        }
    }

    handle
        .outcome()
        .unwrap_or(ExitOutcome::Failed { code: None })
}
