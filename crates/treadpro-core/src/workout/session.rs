use serde::{Deserialize, Serialize};

/// Minimum segment count before a custom session can be started.
pub const MIN_SEGMENTS: usize = 3;
/// Highest speed (km/h) the editor accepts.
pub const MAX_SPEED: f64 = 20.0;
/// Highest incline (%) the editor accepts.
pub const MAX_INCLINE: u32 = 15;

/// One continuous phase of a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    /// Duration in seconds. Always > 0.
    pub duration: u32,
    /// Belt speed in km/h.
    pub speed: f64,
    /// Incline in percent.
    pub incline: u32,
}

impl Segment {
    pub fn new(id: impl Into<String>, duration: u32, speed: f64, incline: u32) -> Self {
        Self {
            id: id.into(),
            duration,
            speed,
            incline,
        }
    }

    /// Distance covered in `secs` seconds at this segment's speed.
    pub fn distance_km(&self, secs: u32) -> f64 {
        self.speed * secs as f64 / 3600.0
    }

    /// Vertical gain in metres over `secs` seconds.
    pub fn climb_m(&self, secs: u32) -> f64 {
        self.distance_km(secs) * 1000.0 * self.incline as f64 / 100.0
    }
}

/// An ordered workout plan.
///
/// Sessions are plain values. Running one never mutates the template: the
/// engine keeps its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub is_custom: bool,
}

/// One point of the speed/incline chart shown next to the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub label: String,
    pub speed: f64,
    pub incline: u32,
    pub duration: u32,
}

impl Session {
    /// Sum of all segment durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.segments.iter().map(|s| s.duration as u64).sum()
    }

    /// Whole minutes, rounded down, as shown in the catalog listing.
    pub fn total_minutes(&self) -> u64 {
        self.total_duration() / 60
    }

    /// Seconds of all segments strictly after `index`.
    pub fn duration_after(&self, index: usize) -> u64 {
        self.segments
            .iter()
            .skip(index + 1)
            .map(|s| s.duration as u64)
            .sum()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Chart data: one point per segment labelled `T1`, `T2`, ...
    pub fn profile(&self) -> Vec<ProfilePoint> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| ProfilePoint {
                label: format!("T{}", i + 1),
                speed: s.speed,
                incline: s.incline,
                duration: s.duration,
            })
            .collect()
    }

    pub fn max_speed(&self) -> f64 {
        self.segments.iter().map(|s| s.speed).fold(0.0, f64::max)
    }

    pub fn max_incline(&self) -> u32 {
        self.segments.iter().map(|s| s.incline).max().unwrap_or(0)
    }
}
