//! Audible cues for a running workout.
//!
//! The engine only emits abstract [`Signal`](crate::events::Signal)s. The
//! runner forwards the two cue signals to whatever [`CueNotifier`] it was
//! given: a [`Chime`] for real output, [`SilentNotifier`] for muted runs and
//! tests.

mod chime;
mod tone;

pub use chime::{Chime, ChimeSettings};
pub use tone::{Beep, ToneSpec, COUNTDOWN_TONE, SEGMENT_END_TONE};

use crate::events::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Countdown,
    SegmentEnd,
}

/// Receiver of audible cues.
///
/// Implementations must return quickly and never fail: they are called
/// from the tick path while the run state is locked.
pub trait CueNotifier: Send + Sync {
    fn on_countdown_cue(&self);
    fn on_segment_end_cue(&self);

    /// Route a cue signal to the matching method. Other signals are ignored.
    fn notify(&self, signal: &Signal) {
        match signal {
            Signal::CountdownCue => self.on_countdown_cue(),
            Signal::SegmentEndCue => self.on_segment_end_cue(),
            _ => {}
        }
    }
}

/// Notifier that ignores every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl CueNotifier for SilentNotifier {
    fn on_countdown_cue(&self) {}
    fn on_segment_end_cue(&self) {}
}
