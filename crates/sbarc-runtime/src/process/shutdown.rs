//! Graceful shutdown for a running tool with SIGTERM → SIGKILL escalation.
//!
//! Tools are spawned as leaders of their own process group, so signals go
//! to the whole group. Helpers forked by the tool are stopped with it.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;
#[cfg(unix)]
use tracing::{debug, warn};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

/// Shut down a child and its process group, then reap it.
///
/// # Strategy
/// 1. Send SIGTERM to the group and wait up to `grace` for exit
/// 2. If still running, SIGKILL the group and the child
/// 3. Wait for reaping (required to avoid zombies)
///
/// # Platform behavior
/// - Unix: nix `killpg` for both signals
/// - Windows: no graceful shutdown; `taskkill /T /F` kills the tree at
///   once, then the leader is killed directly in case taskkill failed
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        shutdown_windows(child).await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    // No pid means the child was already reaped.
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let group = Pid::from_raw(i32::try_from(pid).map_err(io::Error::other)?);

    // Phase 1: SIGTERM with grace period
    match killpg(group, Signal::SIGTERM) {
        Ok(()) => debug!(pid, "Sent SIGTERM to process group"),
        Err(Errno::ESRCH) => return child.wait().await,
        Err(e) => return Err(io::Error::other(e)),
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        // The leader is gone; make sure nothing it forked outlives it.
        let _ = killpg(group, Signal::SIGKILL);
        return result;
    }

    // Phase 2: SIGKILL
    warn!(pid, grace_secs = grace.as_secs_f64(), "Process ignored SIGTERM, sending SIGKILL");
    if let Err(e) = killpg(group, Signal::SIGKILL)
        && e != Errno::ESRCH
    {
        debug!(pid, error = %e, "killpg(SIGKILL) failed, killing leader directly");
    }
    if let Err(e) = child.start_kill() {
        debug!(pid, error = %e, "start_kill failed (process likely already exited)");
    }

    // Phase 3: Wait for reaping (should be fast after SIGKILL)
    child.wait().await
}

#[cfg(not(unix))]
async fn shutdown_windows(child: &mut Child) -> io::Result<ExitStatus> {
    if let Some(pid) = child.id() {
        let mut taskkill = tokio::process::Command::new("taskkill");
        taskkill
            .args(["/PID", &pid.to_string(), "/T", "/F"])
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        #[cfg(windows)]
        taskkill.creation_flags(super::runner::CREATE_NO_WINDOW);

        match taskkill.status().await {
            Ok(status) if status.success() => tracing::debug!(pid, "Killed process tree"),
            Ok(status) => tracing::warn!(pid, %status, "taskkill failed, killing leader only"),
            Err(e) => tracing::warn!(pid, error = %e, "taskkill unavailable, killing leader only"),
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "start_kill failed (process likely already exited)");
    }
    child.wait().await
}
