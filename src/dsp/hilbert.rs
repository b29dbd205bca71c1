//! Hilbert transformer — quadrature component of the analytic signal.
//!
//! The ideal Hilbert impulse response `2/(πn)` for odd `n` (zero for even
//! `n`) is truncated to a fixed length and tapered by a Blackman window.

use std::f64::consts::PI;

use super::fir::convolve;
use super::window::blackman;

/// Length of the Hilbert kernel used by [`analytic_component`].
pub const HILBERT_TAPS: usize = 801;

/// Odd-symmetric Hilbert FIR taps. Even lengths are bumped to the next odd value.
pub fn hilbert_taps(num_taps: usize) -> Vec<f64> {
    let n = (num_taps | 1).max(3);
    let m = ((n - 1) / 2) as isize;
    // n >= 3 so the window is never degenerate.
    let window = blackman(n).unwrap_or_default();

    (-m..=m)
        .zip(window.iter())
        .map(|(k, &w)| {
            if k % 2 == 0 {
                0.0
            } else {
                2.0 / (PI * k as f64) * w
            }
        })
        .collect()
}

/// Return the Hilbert transform of `signal`, time-aligned with the input.
///
/// Samples within `HILBERT_TAPS / 2` of either edge see a truncated kernel
/// and are less accurate.
pub fn analytic_component(signal: &[f32]) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }
    let taps = hilbert_taps(HILBERT_TAPS);
    let offset = (taps.len() - 1) / 2;
    let full = convolve(signal, &taps);
    full[offset..offset + signal.len()].to_vec()
}
