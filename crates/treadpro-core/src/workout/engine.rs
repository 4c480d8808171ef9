//! Workout timer engine.
//!
//! The engine is a logical-second state machine. It does not use internal
//! threads or read the clock: the caller invokes `tick()` once per elapsed
//! second while the run is active (see [`crate::workout::WorkoutRunner`]).
//!
//! The transitions themselves are free functions over a [`RunState`] value,
//! so they can be exercised without any driver:
//!
//! ```text
//! tick(state, session) -> (state, signals)
//! skip(state, session) -> (state, signals)
//! ```
//!
//! ## State Transitions
//!
//! ```text
//! Running <-> Paused
//! Running -> Finished      (last segment exhausted or skipped)
//! Running | Paused -> Cancelled
//! ```
//!
//! `Finished` and `Cancelled` are terminal; every command issued in a
//! terminal state is a no-op.

use serde::{Deserialize, Serialize};

use super::session::{Segment, Session};
use super::summary::WorkoutSummary;
use crate::error::ValidationError;
use crate::events::Signal;

/// A countdown cue fires when the seconds left *before* the decrement are
/// at most this value.
const COUNTDOWN_FROM: u32 = 6;
/// Seconds left at or below which the display shows the alarm state.
const ALARM_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Paused,
    Finished,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Finished | RunStatus::Cancelled)
    }
}

/// Ephemeral state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub segment_index: usize,
    pub segment_seconds_left: u32,
    pub total_seconds_elapsed: u64,
    pub status: RunStatus,
}

impl RunState {
    /// Fresh state positioned at the start of the first segment.
    pub fn initial(session: &Session) -> Result<Self, ValidationError> {
        let first = session
            .segments
            .first()
            .ok_or_else(|| ValidationError::EmptyCollection("session segments".into()))?;
        Ok(Self {
            segment_index: 0,
            segment_seconds_left: first.duration,
            total_seconds_elapsed: 0,
            status: RunStatus::Running,
        })
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}

/// Whether the display should be in its alarm state.
pub fn is_alarming(segment_seconds_left: u32) -> bool {
    segment_seconds_left > 0 && segment_seconds_left <= ALARM_WINDOW
}

/// Advance a running state by one logical second.
pub fn tick(state: RunState, session: &Session) -> (RunState, Vec<Signal>) {
    if !state.is_running() {
        return (state, Vec::new());
    }

    let mut next = state;
    let mut signals = Vec::new();

    if next.segment_seconds_left > 1 {
        let before = next.segment_seconds_left;
        next.segment_seconds_left -= 1;
        if before <= COUNTDOWN_FROM {
            signals.push(Signal::CountdownCue);
        }
    } else {
        match session.segment(next.segment_index + 1) {
            Some(upcoming) => {
                signals.push(Signal::SegmentEndCue);
                next.segment_index += 1;
                next.segment_seconds_left = upcoming.duration;
                signals.push(Signal::SegmentChanged {
                    index: next.segment_index,
                });
            }
            None => {
                next.segment_seconds_left = 0;
                next.status = RunStatus::Finished;
                signals.push(Signal::Finished);
            }
        }
    }

    // The second that triggers a transition still counts.
    next.total_seconds_elapsed += 1;
    (next, signals)
}

/// Jump to the next segment, crediting the remainder of the current one as
/// elapsed. On the last segment this finishes the run.
pub fn skip(state: RunState, session: &Session) -> (RunState, Vec<Signal>) {
    if state.status.is_terminal() {
        return (state, Vec::new());
    }

    let mut next = state;
    next.total_seconds_elapsed += next.segment_seconds_left as u64;

    let signal = match session.segment(next.segment_index + 1) {
        Some(upcoming) => {
            next.segment_index += 1;
            next.segment_seconds_left = upcoming.duration;
            Signal::SegmentChanged {
                index: next.segment_index,
            }
        }
        None => {
            next.segment_seconds_left = 0;
            next.status = RunStatus::Finished;
            Signal::Finished
        }
    };
    (next, vec![signal])
}

pub fn pause(state: RunState) -> RunState {
    match state.status {
        RunStatus::Running => RunState {
            status: RunStatus::Paused,
            ..state
        },
        _ => state,
    }
}

pub fn resume(state: RunState) -> RunState {
    match state.status {
        RunStatus::Paused => RunState {
            status: RunStatus::Running,
            ..state
        },
        _ => state,
    }
}

pub fn cancel(state: RunState) -> RunState {
    if state.status.is_terminal() {
        return state;
    }
    RunState {
        status: RunStatus::Cancelled,
        ..state
    }
}

/// Read-only view of a run for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub session_id: String,
    pub session_name: String,
    pub status: RunStatus,
    pub segment_index: usize,
    pub segment_count: usize,
    pub segment_seconds_left: u32,
    pub total_seconds_elapsed: u64,
    pub total_seconds_left: u64,
    pub total_duration: u64,
    pub current_segment: Segment,
    pub next_segment: Option<Segment>,
    pub is_alarming: bool,
    pub progress_pct: f64,
}

/// A run of one session.
///
/// Owns a private copy of the session so the template the caller picked
/// stays untouched.
#[derive(Debug, Clone)]
pub struct WorkoutEngine {
    session: Session,
    state: RunState,
    /// Seconds actually ticked per segment. Skipped time is not included.
    active_secs: Vec<u32>,
}

impl WorkoutEngine {
    /// Begin a run of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCollection`] if the session has no
    /// segments.
    pub fn start(session: &Session) -> Result<Self, ValidationError> {
        let state = RunState::initial(session)?;
        tracing::debug!(
            session = %session.id,
            segments = session.segments.len(),
            "workout run initialised"
        );
        Ok(Self {
            session: session.clone(),
            state,
            active_secs: vec![0; session.segments.len()],
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn segment_index(&self) -> usize {
        self.state.segment_index
    }

    pub fn segment_seconds_left(&self) -> u32 {
        self.state.segment_seconds_left
    }

    pub fn total_seconds_elapsed(&self) -> u64 {
        self.state.total_seconds_elapsed
    }

    pub fn total_duration(&self) -> u64 {
        self.session.total_duration()
    }

    pub fn total_seconds_left(&self) -> u64 {
        self.total_duration()
            .saturating_sub(self.state.total_seconds_elapsed)
    }

    pub fn current_segment(&self) -> &Segment {
        // The index never leaves [0, len) and the session is non-empty.
        &self.session.segments[self.state.segment_index]
    }

    pub fn next_segment(&self) -> Option<&Segment> {
        self.session.segment(self.state.segment_index + 1)
    }

    pub fn is_alarming(&self) -> bool {
        is_alarming(self.state.segment_seconds_left)
    }

    /// 0.0 .. 100.0 progress across the whole session.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_duration();
        if total == 0 {
            return 0.0;
        }
        (self.state.total_seconds_elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            session_id: self.session.id.clone(),
            session_name: self.session.name.clone(),
            status: self.state.status,
            segment_index: self.state.segment_index,
            segment_count: self.session.segments.len(),
            segment_seconds_left: self.state.segment_seconds_left,
            total_seconds_elapsed: self.state.total_seconds_elapsed,
            total_seconds_left: self.total_seconds_left(),
            total_duration: self.total_duration(),
            current_segment: self.current_segment().clone(),
            next_segment: self.next_segment().cloned(),
            is_alarming: self.is_alarming(),
            progress_pct: self.progress_pct(),
        }
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary::from_run(&self.session, &self.state, &self.active_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call once per elapsed second while running.
    pub fn tick(&mut self) -> Vec<Signal> {
        if !self.state.is_running() {
            return Vec::new();
        }
        if let Some(secs) = self.active_secs.get_mut(self.state.segment_index) {
            *secs += 1;
        }
        let (next, signals) = tick(self.state, &self.session);
        self.apply(next, &signals);
        signals
    }

    pub fn skip(&mut self) -> Vec<Signal> {
        let (next, signals) = skip(self.state, &self.session);
        self.apply(next, &signals);
        signals
    }

    /// Returns `true` if the run was running and is now paused.
    pub fn pause(&mut self) -> bool {
        self.transition(pause(self.state))
    }

    /// Returns `true` if the run was paused and is running again.
    pub fn resume(&mut self) -> bool {
        self.transition(resume(self.state))
    }

    /// Returns `true` if the run was live and is now cancelled.
    pub fn cancel(&mut self) -> bool {
        self.transition(cancel(self.state))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, next: RunState) -> bool {
        let changed = next.status != self.state.status;
        if changed {
            tracing::debug!(from = ?self.state.status, to = ?next.status, "run status changed");
        }
        self.state = next;
        changed
    }

    fn apply(&mut self, next: RunState, signals: &[Signal]) {
        for signal in signals {
            match signal {
                Signal::SegmentChanged { index } => {
                    tracing::debug!(segment = index, "segment changed");
                }
                Signal::Finished => {
                    tracing::debug!(elapsed = next.total_seconds_elapsed, "run finished");
                }
                _ => {}
            }
        }
        self.state = next;
    }
}
