//! Session authoring.
//!
//! The editor is the only place where a session changes. Values are clamped
//! to the configured [`Limits`] as they are entered, so the engine can trust
//! whatever session it is handed. A custom session cannot leave the editor
//! with fewer than `limits.min_segments` segments.

use std::str::FromStr;

use uuid::Uuid;

use crate::catalog::custom_template;
use crate::error::ValidationError;
use crate::storage::Limits;
use crate::workout::{Segment, Session};

/// `DURATION:SPEED:INCLINE`, e.g. `180:5.5:2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpec {
    pub duration: u32,
    pub speed: f64,
    pub incline: u32,
}

impl FromStr for SegmentSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ValidationError::InvalidValue {
            field: "segment".into(),
            message: format!("'{s}': {message}"),
        };
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [duration, speed, incline] = parts.as_slice() else {
            return Err(invalid("expected DURATION:SPEED:INCLINE"));
        };
        Ok(Self {
            duration: duration
                .parse()
                .map_err(|_| invalid("duration must be whole seconds"))?,
            speed: speed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid("speed must be a number"))?,
            incline: incline
                .parse()
                .map_err(|_| invalid("incline must be a whole percentage"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionEditor {
    session: Session,
    limits: Limits,
    is_dirty: bool,
}

impl SessionEditor {
    pub fn new(session: Session, limits: Limits) -> Self {
        Self {
            session,
            limits,
            is_dirty: false,
        }
    }

    /// Editor over a fresh custom template.
    pub fn custom(limits: Limits) -> Self {
        Self::new(custom_template(&limits), limits)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.session.name = name.into();
        self.is_dirty = true;
    }

    /// Set a segment's duration; zero is raised to one second.
    pub fn set_duration(&mut self, index: usize, secs: u32) -> Result<u32, ValidationError> {
        let value = secs.max(1);
        self.segment_mut(index)?.duration = value;
        Ok(value)
    }

    /// Set a segment's speed, clamped to `[0, max_speed]` and rounded to
    /// one decimal. Returns the stored value.
    pub fn set_speed(&mut self, index: usize, kmh: f64) -> Result<f64, ValidationError> {
        if kmh.is_nan() {
            return Err(ValidationError::InvalidValue {
                field: "speed".into(),
                message: "not a number".into(),
            });
        }
        let value = (kmh.clamp(0.0, self.limits.max_speed) * 10.0).round() / 10.0;
        self.segment_mut(index)?.speed = value;
        Ok(value)
    }

    /// Set a segment's incline, clamped to `max_incline`.
    pub fn set_incline(&mut self, index: usize, pct: u32) -> Result<u32, ValidationError> {
        let value = pct.min(self.limits.max_incline);
        self.segment_mut(index)?.incline = value;
        Ok(value)
    }

    /// Append a copy of the last segment. Returns its index.
    pub fn add_segment(&mut self) -> usize {
        let template = self
            .session
            .segments
            .last()
            .cloned()
            .unwrap_or_else(|| Segment::new(String::new(), 180, 5.0, 0));
        self.session.segments.push(Segment {
            id: Uuid::new_v4().to_string(),
            ..template
        });
        self.is_dirty = true;
        self.session.segments.len() - 1
    }

    /// Remove a segment. The last remaining segment cannot be removed.
    pub fn remove_segment(&mut self, index: usize) -> Result<Segment, ValidationError> {
        self.check_index(index)?;
        if self.session.segments.len() == 1 {
            return Err(ValidationError::InvalidValue {
                field: "segments".into(),
                message: "a session keeps at least one segment".into(),
            });
        }
        self.is_dirty = true;
        Ok(self.session.segments.remove(index))
    }

    /// Replace every segment with `specs`, clamping each value. On error
    /// the session is left as it was.
    pub fn replace_segments(&mut self, specs: &[SegmentSpec]) -> Result<(), ValidationError> {
        if specs.is_empty() {
            return Err(ValidationError::EmptyCollection("segments".into()));
        }
        let mut next = self.clone();
        next.session.segments.clear();
        for spec in specs {
            let index = next.add_segment();
            next.set_duration(index, spec.duration)?;
            next.set_speed(index, spec.speed)?;
            next.set_incline(index, spec.incline)?;
        }
        *self = next;
        Ok(())
    }

    /// Check the session can be started.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let count = self.session.segments.len();
        if count == 0 {
            return Err(ValidationError::EmptyCollection("segments".into()));
        }
        if self.session.is_custom && count < self.limits.min_segments {
            return Err(ValidationError::TooFewSegments {
                required: self.limits.min_segments,
                actual: count,
            });
        }
        Ok(())
    }

    /// Hand the authored session over for a run.
    pub fn finish(self) -> Result<Session, ValidationError> {
        self.validate()?;
        Ok(self.session)
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        let len = self.session.segments.len();
        if index >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "segments".into(),
                index,
                len,
            });
        }
        Ok(())
    }

    fn segment_mut(&mut self, index: usize) -> Result<&mut Segment, ValidationError> {
        self.check_index(index)?;
        self.is_dirty = true;
        Ok(&mut self.session.segments[index])
    }
}
