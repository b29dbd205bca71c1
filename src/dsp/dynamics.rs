//! Dynamics — gain with hard clamp, linear fades, peak normalization, and
//! the adaptive speech-lift envelope follower.

/// Samples are held this far inside full scale after gain.
pub const CLAMP_EPSILON: f32 = 1e-6;

/// Window of the speech-lift RMS envelope, in seconds.
const LIFT_WINDOW_S: f64 = 0.010;
/// Exponent of the lift law `(target/rms)^0.35`.
const LIFT_EXPONENT: f64 = 0.35;
const LIFT_MIN_GAIN: f64 = 0.6;
const LIFT_MAX_GAIN: f64 = 2.2;
/// Single-pole smoothing applied to the instantaneous lift gain.
const LIFT_SMOOTHING: f64 = 0.15;
const LIFT_RMS_FLOOR: f64 = 1e-9;

/// Which end of the buffer a fade shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEdge {
    In,
    Out,
}

/// Convert dB to linear amplitude.
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Apply `db` of gain and clamp into `[−1+ε, 1−ε]`.
pub fn gain_db(signal: &[f32], db: f64) -> Vec<f32> {
    gain_db_counting(signal, db).0
}

/// Like [`gain_db`], also returning how many samples hit the clamp.
pub fn gain_db_counting(signal: &[f32], db: f64) -> (Vec<f32>, usize) {
    let g = db_to_linear(db);
    let limit = 1.0 - CLAMP_EPSILON;
    let mut clipped = 0;
    let out = signal
        .iter()
        .map(|&s| {
            let v = (s as f64 * g) as f32;
            if v.abs() > limit {
                clipped += 1;
            }
            v.clamp(-limit, limit)
        })
        .collect();
    (out, clipped)
}

/// Linear fade over `round(ms/1000·sample_rate)` samples at one edge, in place.
///
/// Non-positive `ms` is a no-op. The ramp runs `i/(n−1)` for `i` in `0..n`
/// from the faded edge inward.
pub fn fade(signal: &mut [f32], sample_rate: u32, ms: f64, edge: FadeEdge) {
    if !(ms > 0.0) || signal.is_empty() {
        return;
    }
    let n = ((ms / 1000.0 * sample_rate as f64).round() as usize).min(signal.len());
    if n == 0 {
        return;
    }
    let len = signal.len();
    for i in 0..n {
        let ramp = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
        let idx = match edge {
            FadeEdge::In => i,
            FadeEdge::Out => len - 1 - i,
        };
        signal[idx] *= ramp;
    }
}

/// Scale in place so the absolute peak equals `target_peak`. Silent
/// buffers are left untouched.
pub fn normalize(signal: &mut [f32], target_peak: f32) {
    let peak = super::analysis::peak(signal);
    if peak == 0.0 {
        return;
    }
    let scale = target_peak as f64 / peak as f64;
    for s in signal.iter_mut() {
        *s = (*s as f64 * scale) as f32;
    }
}

/// Smoothed gain carried across samples by the speech lift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeState {
    pub gcur: f64,
}

impl Default for EnvelopeState {
    fn default() -> Self {
        EnvelopeState { gcur: 1.0 }
    }
}

/// Adaptive speech lift starting from unity gain.
pub fn adaptive_speech_lift(signal: &[f32], sample_rate: u32, target_rms: f64) -> Vec<f32> {
    adaptive_speech_lift_with_state(signal, sample_rate, target_rms, EnvelopeState::default()).0
}

/// Lift quiet passages and tame loud ones toward `target_rms`.
///
/// A ~10 ms sliding RMS drives `g = clamp((target/rms)^0.35, 0.6, 2.2)`,
/// which is smoothed by `gcur += 0.15·(g − gcur)` before being applied.
///
/// Only the smoothed gain carries across calls through `state`. The RMS
/// window restarts empty on every call, so feeding a buffer in chunks is
/// not sample-identical to a single pass.
pub fn adaptive_speech_lift_with_state(
    signal: &[f32],
    sample_rate: u32,
    target_rms: f64,
    mut state: EnvelopeState,
) -> (Vec<f32>, EnvelopeState) {
    let window = ((LIFT_WINDOW_S * sample_rate as f64).round() as usize).max(1);
    let mut energy = 0.0f64;
    let mut out = Vec::with_capacity(signal.len());

    for (i, &s) in signal.iter().enumerate() {
        let x = s as f64;
        energy += x * x;
        if i >= window {
            let old = signal[i - window] as f64;
            energy -= old * old;
        }
        let filled = (i + 1).min(window) as f64;
        let env = (energy.max(0.0) / filled).sqrt().max(LIFT_RMS_FLOOR);

        let g = (target_rms / env)
            .powf(LIFT_EXPONENT)
            .clamp(LIFT_MIN_GAIN, LIFT_MAX_GAIN);
        state.gcur += LIFT_SMOOTHING * (g - state.gcur);
        out.push((x * state.gcur) as f32);
    }
    (out, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_scales_and_clamps() {
        let (out, clipped) = gain_db_counting(&[0.1, -0.1, 0.5, -0.9], 6.0206);
        assert!((out[0] - 0.2).abs() < 1e-4);
        assert!((out[1] + 0.2).abs() < 1e-4);
        assert!((out[2] - 1.0).abs() < 1e-4 && out[2] < 1.0);
        assert_eq!(out[3], -(1.0 - CLAMP_EPSILON));
        assert!(clipped >= 1);
    }

    #[test]
    fn zero_gain_is_identity() {
        let x = [0.25f32, -0.5, 0.0];
        assert_eq!(gain_db(&x, 0.0), x.to_vec());
    }

    #[test]
    fn fade_in_ramps_from_zero() {
        let mut x = vec![1.0f32; 100];
        fade(&mut x, 1000, 5.0, FadeEdge::In);
        assert_eq!(x[0], 0.0);
        assert_eq!(x[2], 0.5);
        assert_eq!(x[4], 1.0);
        assert_eq!(x[50], 1.0);
    }

    #[test]
    fn fade_out_ramps_to_zero() {
        let mut x = vec![1.0f32; 100];
        fade(&mut x, 1000, 5.0, FadeEdge::Out);
        assert_eq!(x[99], 0.0);
        assert_eq!(x[97], 0.5);
        assert_eq!(x[95], 1.0);
    }

    #[test]
    fn fade_longer_than_buffer_covers_buffer() {
        let mut x = vec![1.0f32; 3];
        fade(&mut x, 44100, 1000.0, FadeEdge::In);
        assert_eq!(x, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn non_positive_fade_is_noop() {
        let mut x = vec![1.0f32; 10];
        fade(&mut x, 1000, 0.0, FadeEdge::In);
        fade(&mut x, 1000, -3.0, FadeEdge::Out);
        fade(&mut x, 1000, f64::NAN, FadeEdge::Out);
        assert!(x.iter().all(|&s| s == 1.0));
        let mut empty: Vec<f32> = Vec::new();
        fade(&mut empty, 1000, 10.0, FadeEdge::In);
    }

    #[test]
    fn single_sample_fade_silences_it() {
        let mut x = vec![1.0f32; 10];
        fade(&mut x, 1000, 1.0, FadeEdge::In);
        assert_eq!(x[0], 0.0);
        assert_eq!(x[1], 1.0);
    }

    #[test]
    fn normalize_hits_target_peak() {
        let mut x = vec![0.1f32, -0.4, 0.2];
        normalize(&mut x, 0.8);
        assert!((x[1] + 0.8).abs() < 1e-6);
        assert!((x[0] - 0.2).abs() < 1e-6);

        let mut silent = vec![0.0f32; 8];
        normalize(&mut silent, 0.8);
        assert!(silent.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn speech_lift_boosts_quiet_and_cuts_loud() {
        let sr = 8000;
        let quiet: Vec<f32> = (0..4000).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect();
        let loud: Vec<f32> = (0..4000).map(|i| if i % 2 == 0 { 0.9 } else { -0.9 }).collect();
        let q = adaptive_speech_lift(&quiet, sr, 0.1);
        let l = adaptive_speech_lift(&loud, sr, 0.1);
        // (0.1/0.01)^0.35 ≈ 2.24 → clamped to 2.2
        assert!((q[3999].abs() - 0.022).abs() < 1e-4, "quiet tail {}", q[3999]);
        // (0.1/0.9)^0.35 ≈ 0.463 → clamped to 0.6
        assert!((l[3999].abs() - 0.54).abs() < 1e-3, "loud tail {}", l[3999]);
    }

    #[test]
    fn speech_lift_resumes_from_carried_gain_with_fresh_window() {
        let sr = 8000;
        let x: Vec<f32> = (0..600).map(|i| ((i as f32) * 0.37).sin() * 0.05).collect();
        let (head, tail) = x.split_at(300);

        let (_, mid) = adaptive_speech_lift_with_state(head, sr, 0.1, EnvelopeState::default());
        assert!(mid.gcur > 1.0, "quiet input should have raised the gain, got {}", mid.gcur);

        let (resumed, end) = adaptive_speech_lift_with_state(tail, sr, 0.1, mid);
        let (fresh, _) = adaptive_speech_lift_with_state(tail, sr, 0.1, EnvelopeState::default());
        assert_ne!(resumed, fresh, "carried gain must change the continuation");
        assert!(end.gcur.is_finite());

        // The window holds only tail[0] on entry, so the first step smooths from mid.gcur.
        let x0 = tail[0] as f64;
        let g0 = (0.1 / x0.abs().max(LIFT_RMS_FLOOR))
            .powf(LIFT_EXPONENT)
            .clamp(LIFT_MIN_GAIN, LIFT_MAX_GAIN);
        let expected = (x0 * (mid.gcur + LIFT_SMOOTHING * (g0 - mid.gcur))) as f32;
        assert!(
            (resumed[0] - expected).abs() < 1e-7,
            "first resumed sample {} != {}",
            resumed[0],
            expected
        );

        let fresh_gain = 1.0 + LIFT_SMOOTHING * (g0 - 1.0);
        assert!(((fresh[0] as f64) - x0 * fresh_gain).abs() < 1e-7);
    }

    #[test]
    fn speech_lift_keeps_silence() {
        let y = adaptive_speech_lift(&vec![0.0; 500], 44100, 0.1);
        assert!(y.iter().all(|&s| s == 0.0));
    }
}
