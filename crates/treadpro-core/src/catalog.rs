//! Built-in workout plans and the custom-session template.

use chrono::Utc;

use crate::error::ValidationError;
use crate::storage::Limits;
use crate::workout::{Segment, Session};

/// Duration, speed and incline of each segment of the custom template.
const CUSTOM_SEGMENT: (u32, f64, u32) = (180, 5.0, 0);

/// The sessions a user can pick from.
#[derive(Debug, Clone)]
pub struct Catalog {
    sessions: Vec<Session>,
}

fn plan(id: &str, name: &str, description: &str, segments: &[(u32, f64, u32)]) -> Session {
    Session {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        segments: segments
            .iter()
            .enumerate()
            .map(|(i, &(duration, speed, incline))| {
                Segment::new(format!("{id}-{}", i + 1), duration, speed, incline)
            })
            .collect(),
        is_custom: false,
    }
}

fn intervals() -> Vec<(u32, f64, u32)> {
    let mut segments = vec![(300, 6.0, 1)];
    for _ in 0..5 {
        segments.push((60, 10.0, 1));
        segments.push((90, 6.0, 1));
    }
    segments.push((300, 5.0, 0));
    segments
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            sessions: vec![
                plan(
                    "fat-burn",
                    "Fat Burn Walk",
                    "Brisk walk with a steady climb in the middle.",
                    &[
                        (300, 5.0, 1),
                        (600, 5.5, 4),
                        (600, 5.5, 6),
                        (600, 5.5, 4),
                        (300, 4.5, 0),
                    ],
                ),
                plan(
                    "hill-climb",
                    "Hill Climb",
                    "Walking pyramid up to maximum incline and back down.",
                    &[
                        (240, 5.0, 2),
                        (180, 5.0, 5),
                        (180, 4.8, 8),
                        (180, 4.5, 12),
                        (120, 4.5, 15),
                        (180, 4.5, 12),
                        (180, 4.8, 8),
                        (240, 4.5, 0),
                    ],
                ),
                plan(
                    "intervals",
                    "Interval Run",
                    "Five one-minute sprints with active recovery.",
                    &intervals(),
                ),
                plan(
                    "steady-run",
                    "Steady Run",
                    "Easy warm-up, twenty minutes at tempo, cool-down.",
                    &[(300, 6.0, 0), (1200, 9.0, 1), (300, 5.0, 0)],
                ),
            ],
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn find(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Like [`Catalog::find`], but reports unknown ids as an error.
    pub fn get(&self, id: &str) -> Result<&Session, ValidationError> {
        self.find(id)
            .ok_or_else(|| ValidationError::UnknownSession(id.to_string()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A fresh custom session with `limits.min_segments` identical segments,
/// ready to be edited.
pub fn custom_template(limits: &Limits) -> Session {
    let (duration, speed, incline) = CUSTOM_SEGMENT;
    Session {
        id: format!("custom-{}", Utc::now().timestamp_millis()),
        name: "Custom Session".into(),
        description: "Set your own speed and incline targets.".into(),
        segments: (0..limits.min_segments)
            .map(|i| Segment::new(format!("s-{i}"), duration, speed, incline))
            .collect(),
        is_custom: true,
    }
}
