//! Windowed-sinc FIR design and zero-phase (forward-backward) filtering.
//!
//! Kernels are always odd-length and center-tapped so that the
//! forward-backward pass cancels the group delay exactly. Taps are kept
//! in `f64`; signals cross module boundaries as `f32`.

use std::f64::consts::PI;

use super::window::blackman;
use crate::error::{DemodError, Result};

/// An odd-length, center-tapped FIR kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct FirKernel {
    taps: Vec<f64>,
}

impl FirKernel {
    /// Wrap precomputed taps. The length must be odd.
    pub fn from_taps(taps: Vec<f64>) -> Result<Self> {
        if taps.len() % 2 == 0 {
            return Err(DemodError::invalid(format!(
                "FIR kernel length must be odd, got {}",
                taps.len()
            )));
        }
        Ok(FirKernel { taps })
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the center tap, which is also the group delay in samples.
    pub fn center(&self) -> usize {
        (self.taps.len() - 1) / 2
    }
}

/// Design a Blackman-windowed sinc low-pass with unity DC gain.
///
/// Even tap counts are bumped to the next odd value.
pub fn design_lowpass(num_taps: usize, cutoff_hz: f64, sample_rate: u32) -> Result<FirKernel> {
    check_design_args(num_taps, cutoff_hz, sample_rate)?;
    let n = if num_taps % 2 == 0 { num_taps + 1 } else { num_taps };
    let m = ((n - 1) / 2) as isize;
    let f = cutoff_hz / (sample_rate as f64 / 2.0);
    let window = blackman(n)?;

    let mut taps: Vec<f64> = (-m..=m)
        .zip(window.iter())
        .map(|(k, &w)| {
            let ideal = if k == 0 {
                2.0 * f
            } else {
                let k = k as f64;
                (2.0 * PI * f * k).sin() / (PI * k)
            };
            ideal * w
        })
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() < 1e-12 {
        return Err(DemodError::invalid(format!(
            "low-pass at {cutoff_hz} Hz has no DC response with {n} taps"
        )));
    }
    for t in taps.iter_mut() {
        *t /= sum;
    }
    Ok(FirKernel { taps })
}

/// Design a high-pass by spectral inversion of the matching low-pass (`1 − LP`).
pub fn design_highpass(num_taps: usize, cutoff_hz: f64, sample_rate: u32) -> Result<FirKernel> {
    let lp = design_lowpass(num_taps, cutoff_hz, sample_rate)?;
    let center = lp.center();
    let mut taps: Vec<f64> = lp.taps.iter().map(|&t| -t).collect();
    taps[center] += 1.0;
    Ok(FirKernel { taps })
}

fn check_design_args(num_taps: usize, cutoff_hz: f64, sample_rate: u32) -> Result<()> {
    if num_taps == 0 {
        return Err(DemodError::invalid("FIR tap count must be positive"));
    }
    if sample_rate == 0 {
        return Err(DemodError::invalid("sample rate must be positive"));
    }
    let nyquist = sample_rate as f64 / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(DemodError::invalid(format!(
            "FIR cutoff {cutoff_hz} Hz must lie in (0, {nyquist}) Hz"
        )));
    }
    Ok(())
}

/// Full linear convolution; the output has `x.len() + h.len() − 1` samples.
pub(crate) fn convolve_f64(x: &[f64], h: &[f64]) -> Vec<f64> {
    if x.is_empty() || h.is_empty() {
        return Vec::new();
    }
    let mut y = vec![0.0f64; x.len() + h.len() - 1];
    for (n, &xn) in x.iter().enumerate() {
        if xn == 0.0 {
            continue;
        }
        for (acc, &hk) in y[n..n + h.len()].iter_mut().zip(h) {
            *acc += xn * hk;
        }
    }
    y
}

/// Full linear convolution of an `f32` signal with `f64` taps.
pub fn convolve(x: &[f32], h: &[f64]) -> Vec<f32> {
    let x: Vec<f64> = x.iter().map(|&s| s as f64).collect();
    convolve_f64(&x, h).into_iter().map(|s| s as f32).collect()
}

/// Filter forward, then backward, with edge reflection. Output length
/// always equals input length and the net phase shift is zero.
pub fn apply_zero_phase(signal: &[f32], kernel: &FirKernel) -> Vec<f32> {
    let n = signal.len();
    if n == 0 || kernel.is_empty() {
        return signal.to_vec();
    }
    let m = kernel.center();
    let r = (n - 1).min(3 * m);

    let mut padded: Vec<f64> = Vec::with_capacity(n + 2 * r);
    padded.extend(signal[1..=r].iter().rev().map(|&s| s as f64));
    padded.extend(signal.iter().map(|&s| s as f64));
    padded.extend((0..r).map(|j| signal[n - 2 - j] as f64));
    let p = padded.len();

    let forward = convolve_f64(&padded, kernel.taps());
    let mut reversed = forward[m..m + p].to_vec();
    reversed.reverse();

    let backward = convolve_f64(&reversed, kernel.taps());
    let z = &backward[m..m + p];

    (0..n).map(|t| z[p - 1 - (r + t)] as f32).collect()
}
