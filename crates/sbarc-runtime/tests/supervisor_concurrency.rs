//! Single-active-session guarantees under concurrent launches, and dry
//! runs that must never reach the resolver or the runner.

mod common;

use common::{MockRunner, RecordingResolver, download_with_cookie};
use sbarc_core::ports::NoopSink;
use sbarc_core::{ExitOutcome, OperationKind, OutputEvent, SessionState, StreamChannel};
use sbarc_runtime::{
    ChannelSink, LaunchError, LaunchOptions, LaunchSpec, RunHandle, SessionSupervisor,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Counts starts and keeps every run alive until it is cancelled.
fn parked_runner(starts: Arc<AtomicUsize>) -> MockRunner {
    let mut runner = MockRunner::new();
    runner.expect_start().returning(move |spec: LaunchSpec| {
        starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = spec.cancel.clone();
        let sequence = spec.first_sequence;
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = tx.send(OutputEvent::terminal(sequence, ExitOutcome::Cancelled));
        });
        RunHandle::new(Some(4242), rx, spec.cancel)
    });
    runner
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_launches_admit_exactly_one() {
    let starts = Arc::new(AtomicUsize::new(0));
    let sup = Arc::new(SessionSupervisor::new(
        Arc::new(RecordingResolver::finding_everything()),
        Arc::new(parked_runner(Arc::clone(&starts))),
        Arc::new(NoopSink),
    ));

    let barrier = Arc::new(tokio::sync::Barrier::new(16));
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let sup = Arc::clone(&sup);
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            sup.launch(&download_with_cookie(), LaunchOptions::default())
        }));
    }

    let mut admitted = Vec::new();
    let mut refused = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(handle) => admitted.push(handle),
            Err(LaunchError::SessionAlreadyRunning(OperationKind::Download)) => refused += 1,
            Err(other) => panic!("unexpected launch error: {other}"),
        }
    }

    assert_eq!(admitted.len(), 1);
    assert_eq!(refused, 15);

    let handle = admitted.pop().unwrap();
    let mut states = handle.subscribe_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|s| *s == SessionState::Running),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(starts.load(Ordering::SeqCst), 1);

    assert_eq!(sup.cancel_all(), 1);
    assert_eq!(handle.wait().await, SessionState::Cancelled);
    assert_eq!(sup.cancel_all(), 0);
}

#[tokio::test]
async fn dry_run_reaches_completed_without_resolving_or_running() {
    let resolver = Arc::new(RecordingResolver::finding_everything());
    let mut runner = MockRunner::new();
    runner.expect_start().never();
    let (sink, mut rx) = ChannelSink::new();

    let sup = SessionSupervisor::new(resolver.clone(), Arc::new(runner), Arc::new(sink));
    let handle = sup
        .launch(&download_with_cookie(), LaunchOptions { dry_run: true })
        .unwrap();

    assert_eq!(handle.wait().await, SessionState::Completed);
    assert!(handle.is_dry_run());
    assert!(resolver.calls().is_empty());

    let first = rx.recv().await.unwrap();
    assert_eq!(first.event.sequence, 0);
    assert_eq!(first.event.text(), Some(handle.preview()));
    assert!(matches!(
        first.event.payload,
        sbarc_core::OutputPayload::Line {
            channel: StreamChannel::Engine,
            ..
        }
    ));
    let last = rx.recv().await.unwrap();
    assert_eq!(last.event.outcome(), Some(&ExitOutcome::DryRun));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, SessionState::Completed);
    assert!(snapshot.dry_run);
    assert!(snapshot.command.contains("--cookie_val ********"));
}

#[tokio::test]
async fn dry_run_still_occupies_slot_until_done() {
    let resolver = Arc::new(RecordingResolver::finding_everything());
    let starts = Arc::new(AtomicUsize::new(0));
    let sup = SessionSupervisor::new(
        resolver,
        Arc::new(parked_runner(Arc::clone(&starts))),
        Arc::new(NoopSink),
    );

    let dry = sup
        .launch(&download_with_cookie(), LaunchOptions { dry_run: true })
        .unwrap();
    dry.wait().await;

    // A finished dry run never blocks a real one.
    let real = sup
        .launch(&download_with_cookie(), LaunchOptions::default())
        .unwrap();
    assert_ne!(dry.id(), real.id());
    real.cancel();
    assert_eq!(real.wait().await, SessionState::Cancelled);
}
