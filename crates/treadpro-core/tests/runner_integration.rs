//! Integration tests for the wall-clock runner.
//!
//! Tokio's clock is paused, so sleeping advances time instantly and
//! deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use treadpro_core::{CueNotifier, Event, RunStatus, Segment, Session, WorkoutRunner};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Default)]
struct CountingNotifier {
    countdown: AtomicUsize,
    segment_end: AtomicUsize,
}

impl CueNotifier for CountingNotifier {
    fn on_countdown_cue(&self) {
        self.countdown.fetch_add(1, Ordering::SeqCst);
    }
    fn on_segment_end_cue(&self) {
        self.segment_end.fetch_add(1, Ordering::SeqCst);
    }
}

fn two_segments() -> Session {
    Session {
        id: "two".into(),
        name: "Two".into(),
        description: String::new(),
        segments: vec![Segment::new("a", 3, 5.0, 0), Segment::new("b", 2, 6.0, 2)],
        is_custom: false,
    }
}

fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn kind(event: &Event) -> &'static str {
    match event {
        Event::RunStarted { .. } => "started",
        Event::RunPaused { .. } => "paused",
        Event::RunResumed { .. } => "resumed",
        Event::SegmentSkipped { .. } => "skipped",
        Event::CountdownCue { .. } => "countdown",
        Event::SegmentEnded { .. } => "segment_ended",
        Event::SegmentChanged { .. } => "segment_changed",
        Event::RunFinished { .. } => "finished",
        Event::RunCancelled { .. } => "cancelled",
    }
}

#[tokio::test(start_paused = true)]
async fn runs_to_completion_on_its_own() {
    let notifier = Arc::new(CountingNotifier::default());
    let (runner, mut rx) = WorkoutRunner::start(&two_segments(), notifier.clone(), SECOND)
        .await
        .unwrap();

    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push(kind(&event));
        if let Event::SegmentChanged {
            segment_index,
            total_seconds_elapsed,
            ..
        } = &event
        {
            assert_eq!((*segment_index, *total_seconds_elapsed), (1, 3));
        }
        if let Event::RunFinished { summary, .. } = &event {
            assert_eq!(summary.total_seconds_elapsed, 5);
            assert_eq!(summary.active_seconds, 5);
            assert_eq!(summary.status, RunStatus::Finished);
        }
        if event.is_terminal() {
            break;
        }
    }

    assert_eq!(
        kinds,
        vec![
            "started",
            "countdown",
            "countdown",
            "segment_ended",
            "segment_changed",
            "countdown",
            "finished",
        ]
    );
    assert_eq!(notifier.countdown.load(Ordering::SeqCst), 3);
    assert_eq!(notifier.segment_end.load(Ordering::SeqCst), 1);

    let snap = runner.snapshot().await;
    assert_eq!(snap.status, RunStatus::Finished);
    assert_eq!(snap.total_seconds_left, 0);
    assert!(runner.is_terminal().await);

    // The ticker is gone: nothing else arrives.
    tokio::time::sleep(10 * SECOND).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn pause_suppresses_ticks() {
    let notifier = Arc::new(CountingNotifier::default());
    let (runner, mut rx) = WorkoutRunner::start(&two_segments(), notifier, SECOND)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(runner.snapshot().await.segment_seconds_left, 2);

    assert!(runner.pause().await);
    assert!(!runner.pause().await);
    let frozen = runner.snapshot().await;
    tokio::time::sleep(30 * SECOND).await;
    assert_eq!(runner.snapshot().await, frozen);
    assert_eq!(frozen.status, RunStatus::Paused);

    assert!(runner.resume().await);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let snap = runner.snapshot().await;
    assert_eq!(snap.segment_seconds_left, 1);
    assert_eq!(snap.total_seconds_elapsed, 2);

    let kinds: Vec<_> = drain(&mut rx).iter().map(kind).collect();
    assert_eq!(
        kinds,
        vec!["started", "countdown", "paused", "resumed", "countdown"]
    );
    runner.cancel().await;
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_all_signals() {
    let notifier = Arc::new(CountingNotifier::default());
    let (runner, mut rx) = WorkoutRunner::start(&two_segments(), notifier.clone(), SECOND)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(runner.cancel().await);
    assert!(!runner.cancel().await);
    let cues_at_cancel = notifier.countdown.load(Ordering::SeqCst);

    tokio::time::sleep(30 * SECOND).await;
    assert!(runner.skip().await.is_empty());
    assert!(!runner.resume().await);

    let events = drain(&mut rx);
    assert!(matches!(events.last(), Some(Event::RunCancelled { total_seconds_elapsed: 1, .. })));
    assert!(!events.iter().any(|e| matches!(e, Event::RunFinished { .. })));
    assert_eq!(notifier.countdown.load(Ordering::SeqCst), cues_at_cancel);
    assert_eq!(runner.snapshot().await.status, RunStatus::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn skip_through_to_finish() {
    let notifier = Arc::new(CountingNotifier::default());
    let (runner, mut rx) = WorkoutRunner::start(&two_segments(), notifier, SECOND)
        .await
        .unwrap();

    runner.skip().await;
    let snap = runner.snapshot().await;
    assert_eq!(snap.segment_index, 1);
    assert_eq!(snap.total_seconds_elapsed, 3);

    runner.skip().await;
    let events = drain(&mut rx);
    let finished = events
        .iter()
        .filter(|e| matches!(e, Event::RunFinished { .. }))
        .count();
    assert_eq!(finished, 1);

    let summary = runner.summary().await;
    assert_eq!(summary.total_seconds_elapsed, 5);
    assert_eq!(summary.skipped_seconds, 5);
    assert_eq!(summary.distance_km, 0.0);

    tokio::time::sleep(10 * SECOND).await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_session_is_rejected() {
    let session = Session {
        segments: Vec::new(),
        ..two_segments()
    };
    let result = WorkoutRunner::start(&session, Arc::new(CountingNotifier::default()), SECOND).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_ticker() {
    let notifier = Arc::new(CountingNotifier::default());
    let (runner, mut rx) = WorkoutRunner::start(&two_segments(), notifier.clone(), SECOND)
        .await
        .unwrap();
    let other = runner.clone();
    drop(runner);
    drop(other);

    tokio::time::sleep(10 * SECOND).await;
    assert_eq!(notifier.countdown.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.segment_end.load(Ordering::SeqCst), 0);

    let kinds: Vec<_> = drain(&mut rx).iter().map(kind).collect();
    assert_eq!(kinds, vec!["started"]);
    assert!(rx.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_pause_resume_keeps_ticking() {
    let long = Session {
        segments: vec![
            Segment::new("a", 10_000, 5.0, 0),
            Segment::new("b", 10_000, 6.0, 2),
        ],
        ..two_segments()
    };
    let (runner, _rx) = WorkoutRunner::start(
        &long,
        Arc::new(CountingNotifier::default()),
        Duration::from_millis(1),
    )
    .await
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let runner = runner.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    runner.pause().await;
                    tokio::task::yield_now().await;
                    runner.resume().await;
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    runner.resume().await;
    let snap = runner.snapshot().await;
    assert_eq!(snap.status, RunStatus::Running);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let later = runner.snapshot().await;
    assert!(
        later.total_seconds_elapsed > snap.total_seconds_elapsed,
        "running but not ticking: {} -> {}",
        snap.total_seconds_elapsed,
        later.total_seconds_elapsed
    );
    runner.cancel().await;
}
