use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
/// Peak gain at the start of a beep, before volume scaling.
const START_GAIN: f32 = 0.1;
/// Gain at the end of the beep relative to the start (0.1 -> 0.01).
const DECAY_RATIO: f32 = 0.1;

/// Pitch and length of one beep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

pub const COUNTDOWN_TONE: ToneSpec = ToneSpec {
    frequency_hz: 440.0,
    duration_ms: 150,
};

pub const SEGMENT_END_TONE: ToneSpec = ToneSpec {
    frequency_hz: 1200.0,
    duration_ms: 500,
};

/// Finite mono sine beep with an exponential fade-out.
pub struct Beep {
    frequency_hz: f32,
    sample_rate: u32,
    total_samples: usize,
    num_sample: usize,
    volume: f32,
}

impl Beep {
    /// `volume` is a 0.0 ..= 1.0 multiplier on top of the built-in gain.
    pub fn new(spec: ToneSpec, volume: f32) -> Self {
        let total_samples = (SAMPLE_RATE as u64 * spec.duration_ms as u64 / 1000) as usize;
        Self {
            frequency_hz: spec.frequency_hz,
            sample_rate: SAMPLE_RATE,
            total_samples,
            num_sample: 0,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_samples as f64 / self.sample_rate as f64)
    }

    fn gain(&self) -> f32 {
        let progress = self.num_sample as f32 / self.total_samples.max(1) as f32;
        START_GAIN * self.volume * DECAY_RATIO.powf(progress)
    }
}

impl Iterator for Beep {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let t = self.num_sample as f32 / self.sample_rate as f32;
        let sample = (2.0 * PI * self.frequency_hz * t).sin() * self.gain();
        self.num_sample += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total_samples - self.num_sample;
        (left, Some(left))
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for Beep {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }
}
