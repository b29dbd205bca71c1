//! Pipeline configuration, presets, and the guard rules that correct
//! out-of-range numbers before any filter is designed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DemodError, Result};

/// Band-shift strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Strategy {
    /// Long zero-phase FIR band-pass, Hilbert single-sideband rotation,
    /// then zero-phase FIR DC block and post low-pass.
    #[serde(rename_all = "camelCase")]
    FirHilbert {
        #[serde(default = "default_high_pass_taps")]
        high_pass_taps: usize,
        #[serde(default = "default_band_low_pass_taps")]
        band_low_pass_taps: usize,
        #[serde(default = "default_dc_block_taps")]
        dc_block_taps: usize,
        #[serde(default = "default_post_low_pass_taps")]
        post_low_pass_taps: usize,
    },
    /// Biquad cascades around a plain cosine heterodyne.
    #[serde(rename_all = "camelCase")]
    IirHeterodyne {
        /// Identical sections per filter stage.
        #[serde(default = "default_sections")]
        sections: usize,
    },
}

fn default_high_pass_taps() -> usize {
    1025
}
fn default_band_low_pass_taps() -> usize {
    1537
}
fn default_dc_block_taps() -> usize {
    257
}
fn default_post_low_pass_taps() -> usize {
    2049
}
fn default_sections() -> usize {
    2
}

impl Strategy {
    pub fn fir_hilbert() -> Self {
        Strategy::FirHilbert {
            high_pass_taps: default_high_pass_taps(),
            band_low_pass_taps: default_band_low_pass_taps(),
            dc_block_taps: default_dc_block_taps(),
            post_low_pass_taps: default_post_low_pass_taps(),
        }
    }

    pub fn iir_heterodyne() -> Self {
        Strategy::IirHeterodyne {
            sections: default_sections(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Strategy::FirHilbert {
                high_pass_taps,
                band_low_pass_taps,
                dc_block_taps,
                post_low_pass_taps,
            } => {
                let taps = [high_pass_taps, band_low_pass_taps, dc_block_taps, post_low_pass_taps];
                if taps.iter().any(|&&n| n < 2) {
                    return Err(DemodError::invalid(format!(
                        "FIR tap counts must be at least 2, got {taps:?}"
                    )));
                }
            }
            Strategy::IirHeterodyne { sections } => {
                if *sections == 0 {
                    return Err(DemodError::invalid("biquad cascade needs at least one section"));
                }
            }
        }
        Ok(())
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::fir_hilbert()
    }
}

/// Portion of the input to keep, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimWindow {
    pub start_s: f64,
    /// `None` or non-positive keeps everything after `start_s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_s: Option<f64>,
}

/// Caller-facing configuration. Every omitted field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Lower edge of the isolated band.
    pub high_pass_hz: f64,
    /// Upper edge of the isolated band.
    pub pre_low_pass_hz: f64,
    /// Frequency moved to 0 Hz.
    pub shift_hz: f64,
    pub post_low_pass_hz: f64,
    pub gain_db: f64,
    pub fade_ms: f64,
    /// Resample to this rate at the end; `None` keeps the input rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sample_rate: Option<u32>,
    pub enable_dsp: bool,
    pub enable_speech_enhance: bool,
    pub strategy: Strategy,
    pub dc_block_hz: f64,
    pub speech_target_rms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimWindow>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            high_pass_hz: 20200.0,
            pre_low_pass_hz: 23800.0,
            shift_hz: 22050.0,
            post_low_pass_hz: 5200.0,
            gain_db: 12.0,
            fade_ms: 10.0,
            output_sample_rate: None,
            enable_dsp: true,
            enable_speech_enhance: false,
            strategy: Strategy::default(),
            dc_block_hz: 30.0,
            speech_target_rms: 0.1,
            trim: None,
        }
    }
}

/// A guard-rule correction applied by [`PipelineConfig::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardCorrection {
    /// Upper cutoff pulled below `nyquist − guard`.
    UpperClamped { from: f64, to: f64 },
    /// Upper cutoff pushed to `lower + 300` to keep a usable passband.
    UpperWidened { from: f64, to: f64 },
    /// Shift frequency out of range; moved to the band center.
    ShiftCentered { from: f64, to: f64 },
}

impl fmt::Display for GuardCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardCorrection::UpperClamped { from, to } => {
                write!(f, "upper cutoff {from} Hz clamped to {to} Hz (Nyquist guard)")
            }
            GuardCorrection::UpperWidened { from, to } => {
                write!(f, "upper cutoff {from} Hz widened to {to} Hz (minimum band width)")
            }
            GuardCorrection::ShiftCentered { from, to } => {
                write!(f, "shift {from} Hz out of range, centered at {to} Hz")
            }
        }
    }
}

/// Minimum width of the isolated band.
pub const MIN_BAND_WIDTH_HZ: f64 = 300.0;
/// The shift must stay this far from 0 Hz and from Nyquist.
pub const SHIFT_MARGIN_HZ: f64 = 1000.0;

/// Nyquist guard margin for a sample rate.
pub fn guard_margin(sample_rate: u32) -> f64 {
    if sample_rate <= 44500 { 800.0 } else { 500.0 }
}

/// Configuration after the guard rules, bound to one sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub sample_rate: u32,
    pub high_pass_hz: f64,
    pub pre_low_pass_hz: f64,
    pub shift_hz: f64,
    pub post_low_pass_hz: f64,
    pub dc_block_hz: f64,
    pub gain_db: f64,
    pub fade_ms: f64,
    pub output_sample_rate: u32,
    pub enable_speech_enhance: bool,
    pub speech_target_rms: f64,
    pub strategy: Strategy,
    pub corrections: Vec<GuardCorrection>,
}

impl ResolvedConfig {
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }
}

impl PipelineConfig {
    /// Preset for one-minute recordings: keeps 38–42 s.
    pub fn one_minute_preset() -> Self {
        PipelineConfig {
            output_sample_rate: Some(22050),
            trim: Some(TrimWindow {
                start_s: 38.0,
                end_s: Some(42.0),
            }),
            ..Default::default()
        }
    }

    /// Preset for three-minute recordings: keeps 173–177 s.
    pub fn three_minute_preset() -> Self {
        PipelineConfig {
            output_sample_rate: Some(22050),
            trim: Some(TrimWindow {
                start_s: 173.0,
                end_s: Some(177.0),
            }),
            ..Default::default()
        }
    }

    /// Parse a JSON object; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DemodError::invalid(format!("bad config JSON: {e}")))
    }

    /// Apply the guard rules for `sample_rate` and validate what remains.
    pub fn resolve(&self, sample_rate: u32) -> Result<ResolvedConfig> {
        if sample_rate == 0 {
            return Err(DemodError::invalid("sample rate must be positive"));
        }
        for (name, v) in [
            ("highPassHz", self.high_pass_hz),
            ("preLowPassHz", self.pre_low_pass_hz),
            ("postLowPassHz", self.post_low_pass_hz),
            ("dcBlockHz", self.dc_block_hz),
            ("gainDb", self.gain_db),
            ("fadeMs", self.fade_ms),
        ] {
            if !v.is_finite() {
                return Err(DemodError::invalid(format!("{name} must be finite, got {v}")));
            }
        }
        if self.output_sample_rate == Some(0) {
            return Err(DemodError::invalid("output sample rate must be positive"));
        }
        self.strategy.validate()?;

        let nyquist = sample_rate as f64 / 2.0;
        let guard = guard_margin(sample_rate);
        let lower = self.high_pass_hz;
        let mut upper = self.pre_low_pass_hz;
        let mut shift = self.shift_hz;
        let mut corrections = Vec::new();

        if upper > nyquist - guard {
            corrections.push(GuardCorrection::UpperClamped {
                from: upper,
                to: nyquist - guard,
            });
            upper = nyquist - guard;
        }
        if upper < lower + MIN_BAND_WIDTH_HZ {
            corrections.push(GuardCorrection::UpperWidened {
                from: upper,
                to: lower + MIN_BAND_WIDTH_HZ,
            });
            upper = lower + MIN_BAND_WIDTH_HZ;
        }
        if !(shift > SHIFT_MARGIN_HZ && shift < nyquist - SHIFT_MARGIN_HZ) {
            let centered = 0.5 * (lower + upper);
            corrections.push(GuardCorrection::ShiftCentered {
                from: shift,
                to: centered,
            });
            shift = centered;
        }

        if !(lower > 0.0 && lower < nyquist) {
            return Err(DemodError::invalid(format!(
                "high-pass cutoff {lower} Hz must lie in (0, {nyquist}) Hz"
            )));
        }
        if upper >= nyquist {
            return Err(DemodError::invalid(format!(
                "band upper edge {upper} Hz reaches Nyquist ({nyquist} Hz) after guarding"
            )));
        }
        for (name, v) in [("postLowPassHz", self.post_low_pass_hz), ("dcBlockHz", self.dc_block_hz)] {
            if !(v > 0.0 && v < nyquist) {
                return Err(DemodError::invalid(format!(
                    "{name} {v} Hz must lie in (0, {nyquist}) Hz"
                )));
            }
        }
        if self.enable_speech_enhance && !(self.speech_target_rms > 0.0 && self.speech_target_rms.is_finite()) {
            return Err(DemodError::invalid(format!(
                "speech target RMS must be positive, got {}",
                self.speech_target_rms
            )));
        }

        Ok(ResolvedConfig {
            sample_rate,
            high_pass_hz: lower,
            pre_low_pass_hz: upper,
            shift_hz: shift,
            post_low_pass_hz: self.post_low_pass_hz,
            dc_block_hz: self.dc_block_hz,
            gain_db: self.gain_db,
            fade_ms: self.fade_ms,
            output_sample_rate: self.output_sample_rate.unwrap_or(sample_rate),
            enable_speech_enhance: self.enable_speech_enhance,
            speech_target_rms: self.speech_target_rms,
            strategy: self.strategy.clone(),
            corrections,
        })
    }
}
