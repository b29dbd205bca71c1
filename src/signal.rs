//! Mono sample buffer paired with its sample rate.

use serde::{Deserialize, Serialize};

use crate::error::{DemodError, Result};

/// A mono buffer at a fixed sample rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DemodError::invalid("sample rate must be positive"));
        }
        Ok(Signal { samples, sample_rate })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Keep `[floor(start_s·sr), floor(end_s·sr))`, clamped to the buffer.
    ///
    /// A missing or non-positive `end_s` means "to the end". A window that
    /// falls outside the buffer yields an empty signal.
    pub fn slice_seconds(&self, start_s: f64, end_s: Option<f64>) -> Signal {
        let sr = self.sample_rate as f64;
        let len = self.samples.len();
        let start = if start_s > 0.0 {
            ((start_s * sr).floor() as usize).min(len)
        } else {
            0
        };
        let end = match end_s {
            Some(e) if e > 0.0 => ((e * sr).floor() as usize).min(len),
            _ => len,
        };
        let samples = if end > start {
            self.samples[start..end].to_vec()
        } else {
            Vec::new()
        };
        Signal {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}
