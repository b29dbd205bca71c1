//! Buffer statistics used for stage diagnostics and verification.

use crate::error::{DemodError, Result};

/// Root-mean-square level. An empty buffer has RMS 0.
pub fn rms(samples: &[f32]) -> f64 {
    let sum: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum / samples.len().max(1) as f64).sqrt()
}

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

/// Sign changes per second.
///
/// Exact zeros take the sign of the previous non-zero sample, so a signal
/// resting on zero does not count as crossing.
pub fn zero_crossing_rate(samples: &[f32], sample_rate: u32) -> Result<f64> {
    if samples.is_empty() {
        return Err(DemodError::EmptyInput("zero-crossing rate of an empty buffer"));
    }
    if sample_rate == 0 {
        return Err(DemodError::invalid("sample rate must be positive"));
    }

    let mut crossings = 0usize;
    let mut last_sign: Option<bool> = None;
    for &s in samples {
        if s == 0.0 {
            continue;
        }
        let negative = s < 0.0;
        if let Some(prev) = last_sign {
            if prev != negative {
                crossings += 1;
            }
        }
        last_sign = Some(negative);
    }

    let seconds = samples.len() as f64 / sample_rate as f64;
    Ok(crossings as f64 / seconds)
}
