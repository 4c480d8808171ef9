use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc::{self, Sender},
    Mutex,
};
use std::thread;

use super::tone::{Beep, ToneSpec, COUNTDOWN_TONE, SEGMENT_END_TONE};
use super::{Cue, CueNotifier};
use crate::storage::AudioConfig;

/// Pitches, lengths and volume used by [`Chime`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeSettings {
    /// 0.0 ..= 1.0
    pub volume: f32,
    pub countdown: ToneSpec,
    pub segment_end: ToneSpec,
}

impl Default for ChimeSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            countdown: COUNTDOWN_TONE,
            segment_end: SEGMENT_END_TONE,
        }
    }
}

impl From<&AudioConfig> for ChimeSettings {
    fn from(cfg: &AudioConfig) -> Self {
        Self {
            volume: cfg.volume.min(100) as f32 / 100.0,
            countdown: ToneSpec {
                frequency_hz: cfg.countdown_hz,
                duration_ms: cfg.countdown_ms,
            },
            segment_end: ToneSpec {
                frequency_hz: cfg.segment_end_hz,
                duration_ms: cfg.segment_end_ms,
            },
        }
    }
}

impl ChimeSettings {
    fn tone(&self, cue: Cue) -> ToneSpec {
        match cue {
            Cue::Countdown => self.countdown,
            Cue::SegmentEnd => self.segment_end,
        }
    }
}

/// Audible cue player.
///
/// Nothing is played until [`Chime::unlock`] has been called; cues posted
/// before that are dropped silently. After unlocking, cues are handed to a
/// dedicated audio thread that owns the (non-`Send`) output device, so
/// posting never blocks the caller.
pub struct Chime {
    settings: ChimeSettings,
    unlocked: AtomicBool,
    tx: Mutex<Option<Sender<Cue>>>,
    posted: AtomicUsize,
    dropped: AtomicUsize,
}

impl Chime {
    pub fn new(settings: ChimeSettings) -> Self {
        Self {
            settings,
            unlocked: AtomicBool::new(false),
            tx: Mutex::new(None),
            posted: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    pub fn from_config(cfg: &AudioConfig) -> Self {
        Self::new(ChimeSettings::from(cfg))
    }

    /// Start the audio thread. Safe to call any number of times.
    pub fn unlock(&self) {
        if self.unlocked.load(Ordering::SeqCst) {
            return;
        }
        match self.ensure_thread() {
            Ok(()) => {
                self.unlocked.store(true, Ordering::SeqCst);
                tracing::debug!("audio unlocked");
            }
            Err(e) => tracing::warn!("audio unavailable: {e}"),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Cues handed to the audio thread so far.
    pub fn posted(&self) -> usize {
        self.posted.load(Ordering::SeqCst)
    }

    /// Cues dropped because audio was still locked or the thread was gone.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    fn ensure_thread(&self) -> Result<(), String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if guard.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel::<Cue>();
        let settings = self.settings;

        thread::Builder::new()
            .name("treadpro-audio".to_string())
            .spawn(move || {
                let mut output = output::Output::new();
                while let Ok(cue) = rx.recv() {
                    output.play(cue, Beep::new(settings.tone(cue), settings.volume));
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx);
        Ok(())
    }

    fn post(&self, cue: Cue) {
        if !self.is_unlocked() {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            return;
        }
        let sent = self
            .tx
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|tx| tx.send(cue).is_ok()))
            .unwrap_or(false);
        if sent {
            self.posted.fetch_add(1, Ordering::SeqCst);
        } else {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(?cue, "audio thread gone, cue dropped");
        }
    }
}

impl Default for Chime {
    fn default() -> Self {
        Self::new(ChimeSettings::default())
    }
}

impl CueNotifier for Chime {
    fn on_countdown_cue(&self) {
        self.post(Cue::Countdown);
    }

    fn on_segment_end_cue(&self) {
        self.post(Cue::SegmentEnd);
    }
}

#[cfg(feature = "audio")]
mod output {
    use rodio::{OutputStream, Sink};

    use super::{Beep, Cue};

    pub(super) struct Output {
        _stream: Option<OutputStream>,
        sink: Option<Sink>,
    }

    impl Output {
        pub(super) fn new() -> Self {
            Self {
                _stream: None,
                sink: None,
            }
        }

        fn ensure_sink(&mut self) -> Result<&Sink, String> {
            if self.sink.is_none() {
                let (stream, handle) = OutputStream::try_default()
                    .map_err(|e| format!("Failed to create audio output stream: {e}"))?;
                let sink = Sink::try_new(&handle)
                    .map_err(|e| format!("Failed to create audio sink: {e}"))?;
                self._stream = Some(stream);
                self.sink = Some(sink);
            }
            self.sink.as_ref().ok_or_else(|| "audio sink missing".to_string())
        }

        pub(super) fn play(&mut self, cue: Cue, beep: Beep) {
            match self.ensure_sink() {
                Ok(sink) => sink.append(beep),
                Err(e) => tracing::warn!(?cue, "{e}"),
            }
        }
    }
}

#[cfg(not(feature = "audio"))]
mod output {
    use super::{Beep, Cue};

    pub(super) struct Output;

    impl Output {
        pub(super) fn new() -> Self {
            Output
        }

        pub(super) fn play(&mut self, cue: Cue, beep: Beep) {
            tracing::trace!(?cue, duration = ?beep.duration(), "cue (built without audio output)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_before_unlock_are_dropped() {
        let chime = Chime::default();
        chime.on_countdown_cue();
        chime.on_segment_end_cue();
        assert!(!chime.is_unlocked());
        assert_eq!(chime.dropped(), 2);
        assert_eq!(chime.posted(), 0);
    }

    #[test]
    fn unlock_is_idempotent() {
        let chime = Chime::default();
        chime.unlock();
        chime.unlock();
        assert!(chime.is_unlocked());
        chime.on_countdown_cue();
        assert_eq!(chime.posted(), 1);
        assert_eq!(chime.dropped(), 0);
    }

    #[test]
    fn settings_from_config() {
        let cfg = AudioConfig {
            volume: 50,
            countdown_hz: 500.0,
            ..AudioConfig::default()
        };
        let settings = ChimeSettings::from(&cfg);
        assert_eq!(settings.volume, 0.5);
        assert_eq!(settings.countdown.frequency_hz, 500.0);
        assert_eq!(settings.segment_end, SEGMENT_END_TONE);
    }
}
