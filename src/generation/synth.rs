//! Deterministic fallback synthesizer.
//!
//! Produces an A major triad (A4, C#5, E5) under an exponential decay, used
//! whenever the audio model is not available.

use std::f64::consts::PI;

pub const DEFAULT_SAMPLE_RATE: u32 = 32000;

const TRIAD_FREQUENCIES_HZ: [f64; 3] = [440.0, 554.37, 659.25];
const FALLBACK_PEAK: f64 = 0.9;
const I16_SCALE: f64 = 32767.0;

/// Scales `signal` so its largest magnitude becomes `peak`, then converts to
/// 16-bit PCM by multiplying by 32767 and truncating toward zero.
///
/// A silent or non-finite signal yields all zeros.
pub fn quantize(signal: &[f64], peak: f64) -> Vec<i16> {
    let max = signal.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    if max == 0.0 || !max.is_finite() {
        return vec![0; signal.len()];
    }
    signal
        .iter()
        .map(|s| (s / max * peak * I16_SCALE) as i16)
        .collect()
}

/// Renders `duration_seconds` of the fallback triad at `sample_rate`.
///
/// Sample times cover `[0, duration)`: `n = floor(duration * rate)` and
/// `t_i = i * duration / n`, so the endpoint itself is never sampled.
pub fn synthesize_fallback(duration_seconds: f64, sample_rate: u32) -> Vec<i16> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Vec::new();
    }
    let n = (duration_seconds * sample_rate as f64).floor() as usize;
    if n == 0 {
        return Vec::new();
    }
    let step = duration_seconds / n as f64;

    let signal: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * step;
            let tone: f64 = TRIAD_FREQUENCIES_HZ
                .iter()
                .map(|freq| (2.0 * PI * freq * t).sin())
                .sum();
            tone * (-t).exp()
        })
        .collect();

    quantize(&signal, FALLBACK_PEAK)
}
