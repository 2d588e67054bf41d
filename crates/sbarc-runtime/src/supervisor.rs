//! Session supervisor: at most one active session per operation kind.
//!
//! The slot check, the build and the registration of a new session happen
//! under one lock, so two concurrent launches of the same kind cannot both
//! succeed. A slot frees itself as soon as its session reaches a terminal
//! state; the finished entry is also removed once its task ends.

use crate::process::ProcessRunner;
use crate::session::{ExecutionSession, InvalidSession, SessionHandle, SessionOptions};
use sbarc_core::ports::{ExecutableResolver, OutputSink, Tool};
use sbarc_core::{OperationConfig, OperationKind, Settings, ValidationError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Why a launch was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("a {0} session is already running")]
    SessionAlreadyRunning(OperationKind),

    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Options for a single launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub dry_run: bool,
}

type SlotMap = HashMap<OperationKind, SessionHandle>;

fn lock_slots(slots: &Mutex<SlotMap>) -> MutexGuard<'_, SlotMap> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the collaborators and the per-kind session slots.
pub struct SessionSupervisor {
    resolver: Arc<dyn ExecutableResolver>,
    runner: Arc<dyn ProcessRunner>,
    sink: Arc<dyn OutputSink>,
    settings: RwLock<Settings>,
    slots: Arc<Mutex<SlotMap>>,
}

impl SessionSupervisor {
    pub fn new(
        resolver: Arc<dyn ExecutableResolver>,
        runner: Arc<dyn ProcessRunner>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            resolver,
            runner,
            sink,
            settings: RwLock::new(Settings::with_defaults()),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_settings(self, settings: Settings) -> Self {
        self.set_settings(settings);
        self
    }

    /// Replace the settings used by future launches. Running sessions keep
    /// the values they started with.
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate `config` and start it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(
        &self,
        config: &OperationConfig,
        options: LaunchOptions,
    ) -> Result<SessionHandle, LaunchError> {
        let kind = config.kind();
        let settings = self.settings();
        let session_options = SessionOptions::from_settings(&settings, options.dry_run);
        let override_path = settings
            .override_for(Tool::for_kind(kind))
            .map(ToOwned::to_owned);

        let mut slots = lock_slots(&self.slots);
        if let Some(existing) = slots.get(&kind)
            && !existing.is_finished()
        {
            debug!(%kind, session = %existing.id(), "Launch refused, slot busy");
            return Err(LaunchError::SessionAlreadyRunning(kind));
        }

        let session = ExecutionSession::prepare(config, session_options)
            .map_err(|InvalidSession { errors, .. }| LaunchError::Invalid(errors))?;
        let handle = session.handle();
        slots.insert(kind, handle.clone());
        drop(slots);

        info!(session = %handle.id(), %kind, dry_run = options.dry_run, command = %handle.preview(), "Launching session");

        let resolver = Arc::clone(&self.resolver);
        let runner = Arc::clone(&self.runner);
        let sink = Arc::clone(&self.sink);
        let slots = Arc::clone(&self.slots);
        let shared = Arc::clone(session.shared());
        tokio::spawn(async move {
            session
                .run(&*resolver, &*runner, &*sink, override_path.as_deref())
                .await;

            let mut slots = lock_slots(&slots);
            if slots.get(&kind).is_some_and(|h| h.shares(&shared)) {
                slots.remove(&kind);
            }
        });

        Ok(handle)
    }

    /// Redacted command line for `config`, without launching anything.
    pub fn preview(&self, config: &OperationConfig) -> Result<String, Vec<ValidationError>> {
        sbarc_core::preview(config)
    }

    /// The session currently occupying `kind`'s slot, if any.
    pub fn active(&self, kind: OperationKind) -> Option<SessionHandle> {
        lock_slots(&self.slots)
            .get(&kind)
            .filter(|h| !h.is_finished())
            .cloned()
    }

    /// Cancel the active session of `kind`. Returns whether one was running.
    pub fn cancel(&self, kind: OperationKind) -> bool {
        self.active(kind).is_some_and(|handle| {
            handle.cancel();
            true
        })
    }

    /// Cancel every active session. Returns how many were running.
    pub fn cancel_all(&self) -> usize {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| self.cancel(*kind))
            .count()
    }
}

impl std::fmt::Debug for SessionSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSupervisor")
            .field("settings", &self.settings())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{LaunchSpec, RunHandle};
    use sbarc_core::ports::{NoopSink, ResolveError};
    use sbarc_core::{ConvertConfig, DownloadConfig, ExitOutcome, OutputEvent, SessionState};
    use sbarc_core::SessionId;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    struct AnyPath;

    impl ExecutableResolver for AnyPath {
        fn resolve(&self, tool: Tool, override_path: Option<&Path>) -> Result<PathBuf, ResolveError> {
            Ok(override_path.map_or_else(
                || PathBuf::from(format!("/usr/bin/{tool}")),
                Path::to_path_buf,
            ))
        }
    }

    /// Runs until cancelled, then reports `Cancelled`.
    struct UntilCancelled;

    impl ProcessRunner for UntilCancelled {
        fn start(&self, spec: LaunchSpec) -> RunHandle {
            let (tx, rx) = mpsc::unbounded_channel();
            let cancel: CancellationToken = spec.cancel.clone();
            let sequence = spec.first_sequence;
            tokio::spawn(async move {
                cancel.cancelled().await;
                let _ = tx.send(OutputEvent::terminal(sequence, ExitOutcome::Cancelled));
            });
            RunHandle::new(Some(1), rx, spec.cancel)
        }
    }

    /// Exits cleanly as soon as it starts.
    struct ExitsAtOnce;

    impl ProcessRunner for ExitsAtOnce {
        fn start(&self, spec: LaunchSpec) -> RunHandle {
            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(OutputEvent::terminal(spec.first_sequence, ExitOutcome::Succeeded));
            RunHandle::new(Some(7), rx, spec.cancel)
        }
    }

    /// On the first terminal event, records whether the slot still looks
    /// busy and whether a relaunch of the same kind is admitted.
    #[derive(Default)]
    struct RelaunchOnFinish {
        sup: OnceLock<Arc<SessionSupervisor>>,
        seen: Mutex<Vec<(bool, bool)>>,
    }

    impl OutputSink for RelaunchOnFinish {
        fn on_event(&self, _session: SessionId, kind: OperationKind, event: &OutputEvent) {
            let Some(sup) = self.sup.get().filter(|_| event.is_terminal()) else {
                return;
            };
            let mut seen = self.seen.lock().unwrap();
            if seen.is_empty() {
                let busy = sup.active(kind).is_some();
                let relaunched = sup.launch(&download(), LaunchOptions::default()).is_ok();
                seen.push((busy, relaunched));
            }
        }
    }

    fn supervisor() -> SessionSupervisor {
        SessionSupervisor::new(Arc::new(AnyPath), Arc::new(UntilCancelled), Arc::new(NoopSink))
    }

    fn download() -> OperationConfig {
        DownloadConfig::new("https://x.substack.com/", "/out").into()
    }

    fn convert() -> OperationConfig {
        ConvertConfig::new("/posts", vec![PathBuf::from("/posts/a.md")], "/out/a.epub").into()
    }

    #[tokio::test]
    async fn second_launch_of_same_kind_is_refused() {
        let sup = supervisor();
        let first = sup.launch(&download(), LaunchOptions::default()).unwrap();

        let err = sup.launch(&download(), LaunchOptions::default()).unwrap_err();
        assert_eq!(err, LaunchError::SessionAlreadyRunning(OperationKind::Download));

        // Other kind is independent
        let other = sup.launch(&convert(), LaunchOptions::default()).unwrap();

        assert_eq!(sup.cancel_all(), 2);
        assert_eq!(first.wait().await, SessionState::Cancelled);
        assert_eq!(other.wait().await, SessionState::Cancelled);
    }

    #[tokio::test]
    async fn terminal_event_observer_sees_free_slot() {
        let sink = Arc::new(RelaunchOnFinish::default());
        let sup = Arc::new(SessionSupervisor::new(
            Arc::new(AnyPath),
            Arc::new(ExitsAtOnce),
            sink.clone(),
        ));
        sink.sup.set(Arc::clone(&sup)).unwrap();

        let first = sup.launch(&download(), LaunchOptions::default()).unwrap();
        assert_eq!(first.wait().await, SessionState::Completed);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while sink.seen.lock().unwrap().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*sink.seen.lock().unwrap(), vec![(false, true)]);
    }

    #[tokio::test]
    async fn slot_frees_after_terminal_state() {
        let sup = supervisor();
        let first = sup.launch(&download(), LaunchOptions::default()).unwrap();
        assert!(sup.cancel(OperationKind::Download));
        first.wait().await;

        assert!(sup.active(OperationKind::Download).is_none());
        assert!(!sup.cancel(OperationKind::Download));
        let second = sup.launch(&download(), LaunchOptions::default()).unwrap();
        assert_ne!(first.id(), second.id());
        second.cancel();
    }

    #[tokio::test]
    async fn invalid_launch_does_not_take_slot() {
        let sup = supervisor();
        let err = sup
            .launch(&DownloadConfig::default().into(), LaunchOptions::default())
            .unwrap_err();
        let LaunchError::Invalid(errors) = &err else {
            panic!("expected Invalid, got {err:?}");
        };
        assert!(!errors.is_empty());
        assert!(err.to_string().starts_with("invalid configuration: "));
        assert!(sup.active(OperationKind::Download).is_none());
    }

    #[tokio::test]
    async fn dry_run_completes_without_runner() {
        let sup = supervisor();
        let handle = sup
            .launch(&download(), LaunchOptions { dry_run: true })
            .unwrap();
        assert_eq!(handle.wait().await, SessionState::Completed);
        assert_eq!(handle.outcome(), Some(ExitOutcome::DryRun));
    }

    #[test]
    fn settings_can_be_replaced() {
        let mut settings = Settings::with_defaults();
        settings.set_override(Tool::Converter, Some("/opt/pandoc".into()));
        let sup = supervisor().with_settings(settings.clone());
        assert_eq!(sup.settings(), settings);
        assert_eq!(
            sup.preview(&convert()).unwrap(),
            "pandoc /posts/a.md -o /out/a.epub --metadata \"title=Substack Archive\" --metadata author=Unknown --toc --split-level=1"
        );
    }
}
