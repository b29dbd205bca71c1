//! Blackman window — the taper shared by every FIR designer.

use std::f64::consts::PI;

use crate::error::{DemodError, Result};

/// Generate an `n`-point Blackman window.
///
/// `w[i] = 0.42 − 0.5·cos(2πi/(n−1)) + 0.08·cos(4πi/(n−1))`
pub fn blackman(n: usize) -> Result<Vec<f64>> {
    if n < 2 {
        return Err(DemodError::invalid(format!(
            "Blackman window needs at least 2 points, got {n}"
        )));
    }
    let m = (n - 1) as f64;
    Ok((0..n)
        .map(|i| {
            let x = i as f64 / m;
            0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
        })
        .collect())
}
