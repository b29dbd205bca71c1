//! Biquad IIR sections and cascades — the cheap alternative to long FIRs.
//!
//! Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::error::{DemodError, Result};

/// Butterworth (maximally flat) resonance.
pub const BUTTERWORTH_Q: f64 = FRAC_1_SQRT_2;

/// Filter type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    Lowpass,
    Highpass,
}

/// One second-order section with `a0` normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadSection {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Delay line of one section: two past inputs and two past outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl BiquadSection {
    /// Design a low-pass or high-pass section at `frequency` Hz.
    pub fn design(filter_type: FilterType, frequency: f64, q: f64, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DemodError::invalid("sample rate must be positive"));
        }
        let nyquist = sample_rate as f64 / 2.0;
        if !(frequency > 0.0 && frequency < nyquist) {
            return Err(DemodError::invalid(format!(
                "biquad frequency {frequency} Hz must lie in (0, {nyquist}) Hz"
            )));
        }
        if !(q > 0.0 && q.is_finite()) {
            return Err(DemodError::invalid(format!("biquad Q must be positive, got {q}")));
        }

        let w0 = 2.0 * PI * frequency / sample_rate as f64;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterType::Highpass => {
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0)
            }
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        // Normalize by a0
        Ok(BiquadSection {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        })
    }

    pub fn lowpass(frequency: f64, sample_rate: u32) -> Result<Self> {
        Self::design(FilterType::Lowpass, frequency, BUTTERWORTH_Q, sample_rate)
    }

    pub fn highpass(frequency: f64, sample_rate: u32) -> Result<Self> {
        Self::design(FilterType::Highpass, frequency, BUTTERWORTH_Q, sample_rate)
    }

    /// Process a single sample, updating `state`.
    #[inline]
    pub fn process(&self, state: &mut BiquadState, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * state.x1 + self.b2 * state.x2
            - self.a1 * state.y1
            - self.a2 * state.y2;
        state.x2 = state.x1;
        state.x1 = input;
        state.y2 = state.y1;
        state.y1 = output;
        output
    }
}

/// Run one section over a buffer starting from `state`; returns the output
/// and the state after the last sample.
pub fn apply_section(
    signal: &[f32],
    section: &BiquadSection,
    mut state: BiquadState,
) -> (Vec<f32>, BiquadState) {
    let out = signal
        .iter()
        .map(|&s| section.process(&mut state, s as f64) as f32)
        .collect();
    (out, state)
}

/// Run every section in order, each from zero initial conditions.
pub fn apply_cascade(signal: &[f32], sections: &[BiquadSection]) -> Vec<f32> {
    sections.iter().fold(signal.to_vec(), |buf, section| {
        apply_section(&buf, section, BiquadState::default()).0
    })
}

/// `count` identical sections of one type.
pub fn cascade(filter_type: FilterType, frequency: f64, count: usize, sample_rate: u32) -> Result<Vec<BiquadSection>> {
    let section = BiquadSection::design(filter_type, frequency, BUTTERWORTH_Q, sample_rate)?;
    Ok(vec![section; count])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / 44100.0).sin() as f32)
            .collect()
    }

    fn tail_peak(x: &[f32]) -> f32 {
        x[x.len() / 2..].iter().fold(0.0f32, |a, &s| a.max(s.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let lp = BiquadSection::lowpass(5000.0, 44100).unwrap();
        let (out, _) = apply_section(&vec![1.0; 1000], &lp, BiquadState::default());
        let last = out[999];
        assert!((last - 1.0).abs() < 0.001, "Lowpass should pass DC, got {last}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let hp = BiquadSection::highpass(1000.0, 44100).unwrap();
        let (out, _) = apply_section(&vec![1.0; 1000], &hp, BiquadState::default());
        let last = out[999];
        assert!(last.abs() < 0.001, "Highpass should block DC, got {last}");
    }

    #[test]
    fn cascade_steepens_rolloff() {
        let x = sine(10000.0, 4410);
        let one = apply_cascade(&x, &cascade(FilterType::Lowpass, 2000.0, 1, 44100).unwrap());
        let two = apply_cascade(&x, &cascade(FilterType::Lowpass, 2000.0, 2, 44100).unwrap());
        let (p1, p2) = (tail_peak(&one), tail_peak(&two));
        assert!(p1 < 0.1, "single section should attenuate 10 kHz, got {p1}");
        assert!(p2 < p1 * p1 * 1.5, "two sections should roughly square the attenuation: {p2} vs {p1}");
    }

    #[test]
    fn state_round_trips_across_calls() {
        let lp = BiquadSection::lowpass(3000.0, 44100).unwrap();
        let x = sine(1000.0, 512);
        let (whole, _) = apply_section(&x, &lp, BiquadState::default());
        let (first, state) = apply_section(&x[..200], &lp, BiquadState::default());
        let (second, _) = apply_section(&x[200..], &lp, state);
        let joined: Vec<f32> = first.into_iter().chain(second).collect();
        assert_eq!(whole, joined);
    }

    #[test]
    fn cascade_calls_do_not_share_state() {
        let sections = cascade(FilterType::Highpass, 300.0, 2, 44100).unwrap();
        let x = sine(440.0, 1024);
        assert_eq!(apply_cascade(&x, &sections), apply_cascade(&x, &sections));
    }

    #[test]
    fn rejects_out_of_range_frequency() {
        assert!(BiquadSection::lowpass(0.0, 44100).is_err());
        assert!(BiquadSection::lowpass(22050.0, 44100).is_err());
        assert!(BiquadSection::highpass(1000.0, 0).is_err());
        assert!(BiquadSection::design(FilterType::Lowpass, 1000.0, 0.0, 44100).is_err());
    }

    #[test]
    fn output_finite_and_silence_preserved() {
        let sections = cascade(FilterType::Lowpass, 21000.0, 4, 44100).unwrap();
        let impulse: Vec<f32> = (0..10000).map(|i| if i % 100 == 0 { 1.0 } else { 0.0 }).collect();
        assert!(apply_cascade(&impulse, &sections).iter().all(|s| s.is_finite()));
        assert!(apply_cascade(&vec![0.0; 500], &sections).iter().all(|&s| s == 0.0));
    }
}
