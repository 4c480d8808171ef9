use serde::{Deserialize, Serialize};

use super::engine::{RunState, RunStatus};
use super::session::Session;

/// What the summary screen shows once a run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub session_id: String,
    pub session_name: String,
    pub status: RunStatus,
    pub segment_count: usize,
    pub total_duration_secs: u64,
    pub total_seconds_elapsed: u64,
    /// Seconds actually spent on the belt.
    pub active_seconds: u64,
    /// Seconds credited by skipping.
    pub skipped_seconds: u64,
    pub distance_km: f64,
    pub climb_m: f64,
}

impl WorkoutSummary {
    /// Build a summary from the final state of a run.
    ///
    /// `active_secs[i]` holds the seconds ticked in segment `i`; distance and
    /// climb only count those.
    pub fn from_run(session: &Session, state: &RunState, active_secs: &[u32]) -> Self {
        let (distance_km, climb_m) = session
            .segments
            .iter()
            .zip(active_secs)
            .fold((0.0, 0.0), |(km, m), (seg, &secs)| {
                (km + seg.distance_km(secs), m + seg.climb_m(secs))
            });
        let active_seconds: u64 = active_secs.iter().map(|&s| s as u64).sum();

        Self {
            session_id: session.id.clone(),
            session_name: session.name.clone(),
            status: state.status,
            segment_count: session.segments.len(),
            total_duration_secs: session.total_duration(),
            total_seconds_elapsed: state.total_seconds_elapsed,
            active_seconds,
            skipped_seconds: state.total_seconds_elapsed.saturating_sub(active_seconds),
            distance_km,
            climb_m,
        }
    }

    /// Average belt speed over the active seconds, km/h.
    pub fn average_speed(&self) -> f64 {
        if self.active_seconds == 0 {
            return 0.0;
        }
        self.distance_km * 3600.0 / self.active_seconds as f64
    }
}
