use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::WorkoutSummary;

/// Outbound signal produced by a single engine transition.
///
/// Signals are pure values: the engine never performs side effects itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// One of the last seconds before a transition.
    CountdownCue,
    /// The current segment ran out and the next one is starting.
    SegmentEndCue,
    SegmentChanged { index: usize },
    /// The run reached its natural end.
    Finished,
}

impl Signal {
    /// Whether this signal should produce an audible cue.
    pub fn is_cue(&self) -> bool {
        matches!(self, Signal::CountdownCue | Signal::SegmentEndCue)
    }
}

/// Every change in a run produces an Event.
/// Views consume them from the runner's channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted {
        session_id: String,
        segment_count: usize,
        total_duration_secs: u64,
        at: DateTime<Utc>,
    },
    RunPaused {
        segment_index: usize,
        segment_seconds_left: u32,
        at: DateTime<Utc>,
    },
    RunResumed {
        segment_index: usize,
        segment_seconds_left: u32,
        at: DateTime<Utc>,
    },
    SegmentSkipped {
        from_segment: usize,
        skipped_secs: u32,
        at: DateTime<Utc>,
    },
    CountdownCue {
        segment_index: usize,
        segment_seconds_left: u32,
        at: DateTime<Utc>,
    },
    SegmentEnded {
        segment_index: usize,
        at: DateTime<Utc>,
    },
    SegmentChanged {
        segment_index: usize,
        duration_secs: u32,
        speed: f64,
        incline: u32,
        /// Elapsed run time at the moment the segment started.
        total_seconds_elapsed: u64,
        at: DateTime<Utc>,
    },
    RunFinished {
        summary: WorkoutSummary,
        at: DateTime<Utc>,
    },
    RunCancelled {
        total_seconds_elapsed: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the two events after which no further events follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::RunFinished { .. } | Event::RunCancelled { .. })
    }
}
