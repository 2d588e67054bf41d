//! Shared helpers for runtime integration tests.
#![allow(dead_code)]

use mockall::mock;
use sbarc_core::ports::{ExecutableResolver, ResolveError, Tool};
use sbarc_core::{DownloadConfig, OperationConfig, Secret};
use sbarc_runtime::{LaunchSpec, ProcessRunner, RunHandle, SessionEvent, TokioProcessRunner};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

pub const COOKIE: &str = "s%3Areal-cookie-value";

mock! {
    pub Runner {}
    impl ProcessRunner for Runner {
        fn start(&self, spec: LaunchSpec) -> RunHandle;
    }
}

type Resolution = Box<dyn Fn(Tool, Option<&Path>) -> Result<PathBuf, ResolveError> + Send + Sync>;

/// Resolver double that records every call.
pub struct RecordingResolver {
    resolve: Resolution,
    calls: Mutex<Vec<(Tool, Option<PathBuf>)>>,
}

impl RecordingResolver {
    pub fn new(
        resolve: impl Fn(Tool, Option<&Path>) -> Result<PathBuf, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            resolve: Box::new(resolve),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Finds every tool under `/opt/tools`, or at the override if given.
    pub fn finding_everything() -> Self {
        Self::new(|tool, path| {
            Ok(path.map_or_else(|| PathBuf::from(format!("/opt/tools/{tool}")), Path::to_path_buf))
        })
    }

    pub fn not_finding_anything() -> Self {
        Self::new(|tool, _| {
            Err(ResolveError::NotFound {
                tool,
                attempted: vec![PathBuf::from(format!("/usr/bin/{tool}"))],
            })
        })
    }

    pub fn calls(&self) -> Vec<(Tool, Option<PathBuf>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExecutableResolver for RecordingResolver {
    fn resolve(&self, tool: Tool, override_path: Option<&Path>) -> Result<PathBuf, ResolveError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool, override_path.map(Path::to_path_buf)));
        (self.resolve)(tool, override_path)
    }
}

/// Runs a shell script in place of the resolved tool. The tool's real
/// arguments are passed through as `$@`.
pub struct ScriptRunner {
    script: String,
}

impl ScriptRunner {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl ProcessRunner for ScriptRunner {
    fn start(&self, spec: LaunchSpec) -> RunHandle {
        let mut args = vec!["-c".to_string(), self.script.clone(), "sh".to_string()];
        args.extend(spec.args.iter().cloned());
        TokioProcessRunner::new().start(LaunchSpec {
            program: PathBuf::from("/bin/sh"),
            args,
            ..spec
        })
    }
}

pub fn download_with_cookie() -> OperationConfig {
    DownloadConfig::new("https://example.substack.com/", "/tmp/sbarc-out")
        .with_cookie("substack.sid", Secret::new(COOKIE))
        .into()
}

/// Receive until the terminal event of any session, or time out.
pub async fn collect_until_terminal(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        let done = event.event.is_terminal();
        events.push(event);
        if done {
            break;
        }
    }
    events
}
