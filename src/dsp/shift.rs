//! Spectral shifters — move a band centered at `shift_hz` down to 0 Hz.
//!
//! Both mixers draw their carrier from one [`LocalOscillator`] stepped once
//! per sample over the whole buffer, so the carrier phase is continuous
//! end to end.

use std::f64::consts::TAU;

/// Phase-accumulating carrier at a fixed frequency.
#[derive(Debug, Clone)]
pub struct LocalOscillator {
    phase: f64,
    phase_inc: f64,
}

impl LocalOscillator {
    pub fn new(frequency: f64, sample_rate: u32) -> Self {
        LocalOscillator {
            phase: 0.0,
            phase_inc: TAU * frequency / sample_rate as f64,
        }
    }

    /// Current carrier as `(cos φ, sin φ)`, then advance φ by one sample.
    pub fn next_carrier(&mut self) -> (f64, f64) {
        let carrier = (self.phase.cos(), self.phase.sin());
        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        } else if self.phase < 0.0 {
            self.phase += TAU;
        }
        carrier
    }
}

/// Single-sideband demodulation by complex rotation:
/// `y = Re{(x + j·xh)·e^(−jφ)} = x·cos φ + xh·sin φ`.
///
/// `xh` is the Hilbert companion of `x`; the output has the length of the
/// shorter of the two.
pub fn hilbert_demod(x: &[f32], xh: &[f32], sample_rate: u32, shift_hz: f64) -> Vec<f32> {
    let mut lo = LocalOscillator::new(shift_hz, sample_rate);
    x.iter()
        .zip(xh)
        .map(|(&i, &q)| {
            let (c, s) = lo.next_carrier();
            (i as f64 * c + q as f64 * s) as f32
        })
        .collect()
}

/// Plain real mixing: `y = x·cos φ`. Leaves both the sum and the
/// difference image; a following low-pass must remove the sum.
pub fn heterodyne(x: &[f32], sample_rate: u32, shift_hz: f64) -> Vec<f32> {
    let mut lo = LocalOscillator::new(shift_hz, sample_rate);
    x.iter()
        .map(|&s| {
            let (c, _) = lo.next_carrier();
            (s as f64 * c) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::analysis::zero_crossing_rate;
    use std::f64::consts::PI;

    fn tone(f: f64, sr: u32, len: usize, phase: f64) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * f * i as f64 / sr as f64 + phase).cos() as f32)
            .collect()
    }

    #[test]
    fn oscillator_phase_is_continuous() {
        let mut lo = LocalOscillator::new(1000.0, 8000);
        let mut prev = lo.next_carrier();
        for _ in 0..100_000 {
            let cur = lo.next_carrier();
            let step = (cur.0 - prev.0).hypot(cur.1 - prev.1);
            // Chord length of a π/4 step on the unit circle.
            assert!((step - 0.765_366_864).abs() < 1e-6, "phase jump: {step}");
            prev = cur;
        }
    }

    #[test]
    fn ssb_rotation_keeps_only_difference_frequency() {
        let sr = 8000;
        let len = 8000;
        // Ideal analytic pair for a 1500 Hz tone.
        let x = tone(1500.0, sr, len, 0.0);
        let xh = tone(1500.0, sr, len, -PI / 2.0);
        let y = hilbert_demod(&x, &xh, sr, 1000.0);
        assert_eq!(y.len(), len);
        for (i, &s) in y.iter().enumerate().step_by(97) {
            let expected = (2.0 * PI * 500.0 * i as f64 / sr as f64).cos() as f32;
            assert!((s - expected).abs() < 1e-4, "sample {i}: {s} vs {expected}");
        }
    }

    #[test]
    fn heterodyne_halves_amplitude_into_two_images() {
        let sr = 8000;
        let x = tone(1500.0, sr, 8000, 0.0);
        let y = heterodyne(&x, sr, 1000.0);
        // cos a·cos b = ½cos(a−b) + ½cos(a+b)
        for (i, &s) in y.iter().enumerate().step_by(89) {
            let t = i as f64 / sr as f64;
            let expected =
                (0.5 * (2.0 * PI * 500.0 * t).cos() + 0.5 * (2.0 * PI * 2500.0 * t).cos()) as f32;
            assert!((s - expected).abs() < 1e-4, "sample {i}: {s} vs {expected}");
        }
        let zcr_in = zero_crossing_rate(&x, sr).unwrap();
        assert!(zcr_in > 2900.0 && zcr_in < 3100.0, "input zcr {zcr_in}");
    }

    #[test]
    fn silence_stays_silent() {
        let z = vec![0.0f32; 256];
        assert!(hilbert_demod(&z, &z, 44100, 22050.0).iter().all(|&s| s == 0.0));
        assert!(heterodyne(&z, 44100, 20725.0).iter().all(|&s| s == 0.0));
    }
}
