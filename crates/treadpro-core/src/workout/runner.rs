//! Wall-clock driver for a [`WorkoutEngine`].
//!
//! The runner owns the engine behind a single `tokio::sync::Mutex`. Both the
//! periodic ticker task and the user commands (`pause`, `resume`, `skip`,
//! `cancel`) go through that lock, so ticks are never re-entered and a tick
//! racing a pause or cancel sees the new status and does nothing.
//!
//! The ticker task only exists while the run is `Running`: it is aborted on
//! pause and cancel, respawned on resume, and exits on its own once the run
//! finishes or the last handle is dropped.
//!
//! Lock order is `ticker` then `engine`. Commands hold the `ticker` lock
//! across the status change and the matching abort or respawn; the ticker
//! task itself only ever takes `engine`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};

use super::engine::{RunSnapshot, RunState, WorkoutEngine};
use super::session::Session;
use super::summary::WorkoutSummary;
use crate::audio::CueNotifier;
use crate::error::ValidationError;
use crate::events::{Event, Signal};

/// One logical second per real second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Shared {
    engine: Mutex<WorkoutEngine>,
    notifier: Arc<dyn CueNotifier>,
    events: mpsc::UnboundedSender<Event>,
}

impl Shared {
    fn emit(&self, event: Event) {
        // A view that stopped listening is not an error.
        let _ = self.events.send(event);
    }

    /// Forward the signals of one transition. Called with the engine locked.
    fn dispatch(&self, engine: &WorkoutEngine, before: RunState, signals: &[Signal]) {
        for signal in signals {
            if signal.is_cue() {
                self.notifier.notify(signal);
            }
            self.emit(signal_event(engine, before, *signal));
        }
    }
}

fn signal_event(engine: &WorkoutEngine, before: RunState, signal: Signal) -> Event {
    let at = Utc::now();
    match signal {
        Signal::CountdownCue => Event::CountdownCue {
            segment_index: engine.segment_index(),
            segment_seconds_left: engine.segment_seconds_left(),
            at,
        },
        Signal::SegmentEndCue => Event::SegmentEnded {
            segment_index: before.segment_index,
            at,
        },
        Signal::SegmentChanged { index } => {
            let segment = engine.current_segment();
            Event::SegmentChanged {
                segment_index: index,
                duration_secs: segment.duration,
                speed: segment.speed,
                incline: segment.incline,
                total_seconds_elapsed: engine.total_seconds_elapsed(),
                at,
            }
        }
        Signal::Finished => Event::RunFinished {
            summary: engine.summary(),
            at,
        },
    }
}

/// Handle to a running workout. Cheap to clone.
#[derive(Clone)]
pub struct WorkoutRunner {
    shared: Arc<Shared>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl WorkoutRunner {
    /// Start running `session`, ticking every `tick_interval`.
    ///
    /// Returns the handle and the stream of [`Event`]s for the hosting view.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCollection`] for a session without
    /// segments.
    pub async fn start(
        session: &Session,
        notifier: Arc<dyn CueNotifier>,
        tick_interval: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Event>), ValidationError> {
        let engine = WorkoutEngine::start(session)?;
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::info!(
            session = %session.id,
            segments = session.segments.len(),
            total_secs = session.total_duration(),
            "workout started"
        );
        let _ = tx.send(Event::RunStarted {
            session_id: session.id.clone(),
            segment_count: session.segments.len(),
            total_duration_secs: session.total_duration(),
            at: Utc::now(),
        });

        let runner = Self {
            shared: Arc::new(Shared {
                engine: Mutex::new(engine),
                notifier,
                events: tx,
            }),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        };
        {
            let mut ticker = runner.ticker.lock().await;
            runner.spawn_ticker(&mut ticker);
        }
        Ok((runner, rx))
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        self.shared.engine.lock().await.snapshot()
    }

    pub async fn summary(&self) -> WorkoutSummary {
        self.shared.engine.lock().await.summary()
    }

    pub async fn is_terminal(&self) -> bool {
        self.shared.engine.lock().await.status().is_terminal()
    }

    /// Returns `true` if the run was running and is now paused.
    pub async fn pause(&self) -> bool {
        let mut ticker = self.ticker.lock().await;
        let mut engine = self.shared.engine.lock().await;
        if !engine.pause() {
            return false;
        }
        self.shared.emit(Event::RunPaused {
            segment_index: engine.segment_index(),
            segment_seconds_left: engine.segment_seconds_left(),
            at: Utc::now(),
        });
        drop(engine);
        abort_ticker(&mut ticker);
        true
    }

    /// Returns `true` if the run was paused and is running again.
    pub async fn resume(&self) -> bool {
        let mut ticker = self.ticker.lock().await;
        let mut engine = self.shared.engine.lock().await;
        if !engine.resume() {
            return false;
        }
        self.shared.emit(Event::RunResumed {
            segment_index: engine.segment_index(),
            segment_seconds_left: engine.segment_seconds_left(),
            at: Utc::now(),
        });
        drop(engine);
        self.spawn_ticker(&mut ticker);
        true
    }

    /// Skip the rest of the current segment. On the last segment this
    /// finishes the run.
    pub async fn skip(&self) -> Vec<Signal> {
        let mut ticker = self.ticker.lock().await;
        let mut engine = self.shared.engine.lock().await;
        let before = engine.state();
        let signals = engine.skip();
        if signals.is_empty() {
            return signals;
        }
        self.shared.emit(Event::SegmentSkipped {
            from_segment: before.segment_index,
            skipped_secs: before.segment_seconds_left,
            at: Utc::now(),
        });
        self.shared.dispatch(&engine, before, &signals);
        if engine.status().is_terminal() {
            tracing::info!("workout finished by skip");
            drop(engine);
            abort_ticker(&mut ticker);
        }
        signals
    }

    /// Stop the run without a completion signal. The ticker is gone when
    /// this returns.
    pub async fn cancel(&self) -> bool {
        let mut ticker = self.ticker.lock().await;
        let mut engine = self.shared.engine.lock().await;
        let changed = engine.cancel();
        if changed {
            tracing::info!(elapsed = engine.total_seconds_elapsed(), "workout cancelled");
            self.shared.emit(Event::RunCancelled {
                total_seconds_elapsed: engine.total_seconds_elapsed(),
                at: Utc::now(),
            });
        }
        drop(engine);
        abort_ticker(&mut ticker);
        changed
    }

    /// Replace the ticker task. Callers hold the `ticker` lock across the
    /// status change that requires it.
    fn spawn_ticker(&self, slot: &mut Option<JoinHandle<()>>) {
        abort_ticker(slot);

        // The task only holds a weak reference: once every handle is gone
        // the run is abandoned and the task stops at its next tick.
        let shared = Arc::downgrade(&self.shared);
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                interval.tick().await;

                let Some(shared) = shared.upgrade() else {
                    tracing::debug!("runner dropped, ticker exiting");
                    break;
                };
                let mut engine = shared.engine.lock().await;
                if !engine.state().is_running() {
                    break;
                }
                let before = engine.state();
                let signals = engine.tick();
                shared.dispatch(&engine, before, &signals);

                if engine.status().is_terminal() {
                    tracing::info!(
                        elapsed = engine.total_seconds_elapsed(),
                        "workout finished"
                    );
                    break;
                }
            }
        });

        *slot = Some(handle);
    }
}

fn abort_ticker(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}
