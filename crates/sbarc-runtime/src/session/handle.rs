//! Shared session state and the caller-facing handle.

use super::buffer::OutputBuffer;
use chrono::{DateTime, Utc};
use sbarc_core::ports::OutputSink;
use sbarc_core::{
    ExitOutcome, OperationKind, OutputEvent, SessionId, SessionSnapshot, SessionState,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) struct SessionShared {
    id: SessionId,
    kind: OperationKind,
    started_at: DateTime<Utc>,
    dry_run: bool,
    /// Redacted command line; empty when validation failed.
    preview: String,
    state: watch::Sender<SessionState>,
    outcome: Mutex<Option<ExitOutcome>>,
    output: Mutex<OutputBuffer>,
    cancel: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionShared {
    pub(crate) fn new(
        kind: OperationKind,
        dry_run: bool,
        preview: String,
        retained_lines: usize,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            id: SessionId::new(),
            kind,
            started_at: Utc::now(),
            dry_run,
            preview,
            state,
            outcome: Mutex::new(None),
            output: Mutex::new(OutputBuffer::new(retained_lines)),
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) const fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Move to `next` if the lifecycle allows it.
    pub(crate) fn transition(&self, next: SessionState) -> bool {
        let mut from = None;
        let moved = self.state.send_if_modified(|state| {
            from = Some(*state);
            if state.can_transition_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });

        let from = from.unwrap_or(SessionState::Idle);
        if moved {
            info!(session = %self.id, kind = %self.kind, %from, to = %next, "Session state changed");
        } else {
            warn!(session = %self.id, kind = %self.kind, %from, to = %next, "Ignoring invalid session transition");
        }
        moved
    }

    /// Record an event and hand it to the sink.
    pub(crate) fn emit(&self, sink: &dyn OutputSink, event: OutputEvent) {
        if let Some(text) = event.text() {
            debug!(session = %self.id, seq = event.sequence, "{text}");
        }
        lock(&self.output).push(event.clone());
        sink.on_event(self.id, self.kind, &event);
    }

    /// Enter the terminal state for `outcome`, then emit the terminal event.
    ///
    /// The state is terminal before the sink sees the event, so an observer
    /// reacting to it finds the slot already free.
    pub(crate) fn finish(&self, sink: &dyn OutputSink, sequence: u64, outcome: ExitOutcome) {
        let event = OutputEvent::terminal(sequence, outcome.clone());
        let state = SessionState::for_outcome(&outcome);
        lock(&self.output).push(event.clone());
        *lock(&self.outcome) = Some(outcome);
        self.transition(state);
        sink.on_event(self.id, self.kind, &event);
    }
}

/// Caller's view of a session. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl SessionHandle {
    pub(crate) const fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    pub(crate) fn shares(&self, other: &Arc<SessionShared>) -> bool {
        Arc::ptr_eq(&self.shared, other)
    }

    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    pub fn kind(&self) -> OperationKind {
        self.shared.kind
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.shared.started_at
    }

    pub fn is_dry_run(&self) -> bool {
        self.shared.dry_run
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Redacted command line this session runs.
    pub fn preview(&self) -> &str {
        &self.shared.preview
    }

    /// Retained output so far, oldest first.
    pub fn output(&self) -> Vec<OutputEvent> {
        lock(&self.shared.output).to_vec()
    }

    /// `None` until the session reaches a terminal state, and for sessions
    /// rejected by validation.
    pub fn outcome(&self) -> Option<ExitOutcome> {
        lock(&self.shared.outcome).clone()
    }

    /// Request cancellation. Safe to call any number of times, in any state.
    pub fn cancel(&self) {
        if !self.shared.cancel.is_cancelled() {
            info!(session = %self.shared.id, kind = %self.shared.kind, "Cancellation requested");
        }
        self.shared.cancel.cancel();
    }

    /// Wait for a terminal state and return it.
    pub async fn wait(&self) -> SessionState {
        let mut rx = self.shared.state.subscribe();
        let result = rx.wait_for(|state| state.is_terminal()).await.map(|s| *s);
        // The sender lives in `shared`, which we hold, so this cannot close.
        result.unwrap_or_else(|_| self.state())
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id(),
            kind: self.kind(),
            state: self.state(),
            started_at: self.started_at(),
            command: self.preview().to_string(),
            dry_run: self.is_dry_run(),
            outcome: self.outcome(),
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
