//! Sample-accurate renderer

use std::f64::consts::TAU;

use crate::RingCadence;

/// Render the cadence to mono f32 samples
///
/// Sample `n` is evaluated at exactly `n / sample_rate` seconds, so ramp
/// boundaries land on the same sample regardless of buffer sizes downstream.
pub fn render(cadence: &RingCadence, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f64;
    let len = (cadence.duration_secs() * rate).round() as usize;

    (0..len)
        .map(|n| {
            let t = n as f64 / rate;
            let gain = cadence.gain_at(t) as f64;
            if gain == 0.0 {
                return 0.0;
            }
            let mix: f64 = cadence
                .frequencies
                .iter()
                .map(|f| (TAU * f * t).sin())
                .sum();
            (mix * gain) as f32
        })
        .collect()
}
