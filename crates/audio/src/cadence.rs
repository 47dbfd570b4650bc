//! Ring cadence and gain envelope
//!
//! Times are in seconds from cue start.

use voice_concierge_config::RingSettings;

/// One ring burst: linear ramp up, hold, linear ramp down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub start: f64,
    pub end: f64,
    /// Duration of each ramp
    pub ramp: f64,
}

impl Burst {
    pub const fn new(start: f64, end: f64, ramp: f64) -> Self {
        Self { start, end, ramp }
    }

    /// Envelope value in `[0, 1]` at time `t`
    pub fn envelope(&self, t: f64) -> f64 {
        if t < self.start || t >= self.end {
            0.0
        } else if t < self.start + self.ramp {
            (t - self.start) / self.ramp
        } else if t > self.end - self.ramp {
            (self.end - t) / self.ramp
        } else {
            1.0
        }
    }
}

/// UK-style double ring: two bursts of mixed 400 Hz and 450 Hz sines
#[derive(Debug, Clone, PartialEq)]
pub struct RingCadence {
    pub frequencies: Vec<f64>,
    /// Gain of each oscillator at the top of a burst
    pub peak_gain: f32,
    pub bursts: Vec<Burst>,
}

const RAMP_SECS: f64 = 0.03;

impl Default for RingCadence {
    fn default() -> Self {
        Self {
            frequencies: vec![400.0, 450.0],
            peak_gain: 0.22,
            bursts: vec![
                Burst::new(0.0, 1.0, RAMP_SECS),
                // 0.4s of silence, then the second ring
                Burst::new(1.4, 2.4, RAMP_SECS),
            ],
        }
    }
}

impl RingCadence {
    pub fn from_settings(settings: &RingSettings) -> Self {
        Self {
            peak_gain: settings.peak_gain,
            ..Self::default()
        }
    }

    /// Per-oscillator gain at time `t`
    pub fn gain_at(&self, t: f64) -> f32 {
        let env = self
            .bursts
            .iter()
            .map(|b| b.envelope(t))
            .fold(0.0, f64::max);
        (env * self.peak_gain as f64) as f32
    }

    /// End of the last ramp-down
    pub fn duration_secs(&self) -> f64 {
        self.bursts.iter().map(|b| b.end).fold(0.0, f64::max)
    }
}
