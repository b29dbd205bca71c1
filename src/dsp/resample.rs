//! Linear-interpolation sample-rate conversion.

use crate::error::{DemodError, Result};

/// Resample `signal` from `from_rate` to `to_rate`.
///
/// The output has `floor(len · to_rate / from_rate)` samples; output `i`
/// interpolates between the two input samples around `i · from_rate / to_rate`.
/// Equal rates return the input unchanged.
pub fn resample_linear(signal: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(DemodError::invalid(format!(
            "cannot resample {from_rate} Hz → {to_rate} Hz"
        )));
    }
    if from_rate == to_rate || signal.is_empty() {
        return Ok(signal.to_vec());
    }

    let out_len = (signal.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;
    let last = signal.len() - 1;

    Ok((0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let a = signal[idx];
            let b = signal[(idx + 1).min(last)];
            a + frac * (b - a)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::analysis::zero_crossing_rate;
    use std::f64::consts::PI;

    fn tone(f: f64, sr: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * f * i as f64 / sr as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn equal_rates_are_identity() {
        let x = vec![0.1f32, 0.2, 0.3];
        assert_eq!(resample_linear(&x, 44100, 44100).unwrap(), x);
    }

    #[test]
    fn output_length_is_floored() {
        let x = vec![0.0f32; 44101];
        assert_eq!(resample_linear(&x, 44100, 22050).unwrap().len(), 22050);
        assert_eq!(resample_linear(&x[..3], 3, 2).unwrap().len(), 2);
        assert!(resample_linear(&[], 44100, 8000).unwrap().is_empty());
    }

    #[test]
    fn upsampling_interpolates_midpoints() {
        let y = resample_linear(&[0.0, 1.0, 0.0], 1, 2).unwrap();
        assert_eq!(y, vec![0.0, 0.5, 1.0, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(resample_linear(&[1.0], 0, 8000).is_err());
        assert!(resample_linear(&[1.0], 8000, 0).is_err());
    }

    #[test]
    fn round_trip_preserves_frequency() {
        let (a, b) = (44100u32, 22050u32);
        let f = 440.0;
        let x = tone(f, a, a as usize);
        let down = resample_linear(&x, a, b).unwrap();
        let back = resample_linear(&down, b, a).unwrap();

        let zcr_x = zero_crossing_rate(&x, a).unwrap();
        let zcr_back = zero_crossing_rate(&back, a).unwrap();
        let tolerance = 2.0 * f * a as f64 / b.min(a) as f64 / 100.0;
        assert!(
            (zcr_x - zcr_back).abs() <= tolerance,
            "zero-crossing rate drifted: {zcr_x} vs {zcr_back}"
        );
        assert!((zcr_x / 2.0 - f).abs() < 2.0);
    }
}
