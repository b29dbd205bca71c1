//! Pipeline orchestrator — composes the DSP stages into one run.
//!
//! trim → guard → band isolation → shift to baseband → DC block →
//! post low-pass → (speech lift) → gain → fades → (resample).
//!
//! The band isolation and shift come from one of two strategies; the guard
//! rules and the dynamics/resample tail are shared.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{PipelineConfig, ResolvedConfig, Strategy};
use crate::dsp::analysis::rms;
use crate::dsp::dynamics::{FadeEdge, adaptive_speech_lift, fade, gain_db_counting, normalize};
use crate::dsp::filter::{FilterType, apply_cascade, cascade};
use crate::dsp::fir::{apply_zero_phase, design_highpass, design_lowpass};
use crate::dsp::hilbert::analytic_component;
use crate::dsp::resample::resample_linear;
use crate::dsp::shift::{heterodyne, hilbert_demod};
use crate::dsp::wav::encode_pcm16_mono;
use crate::error::Result;
use crate::signal::Signal;

/// Shortest fade the orchestrator applies at either edge.
pub const MIN_FADE_MS: f64 = 6.0;
/// Peak level the speech-enhanced signal is normalized to before gain.
pub const SPEECH_NORMALIZE_PEAK: f32 = 0.25;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Samples that hit the clamp after gain.
    pub clipped_samples: usize,
    /// The guarded configuration; `None` when DSP was bypassed.
    #[serde(skip)]
    pub resolved: Option<ResolvedConfig>,
}

impl ProcessedSignal {
    pub fn into_signal(self) -> Signal {
        Signal {
            samples: self.samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Encode as 16-bit mono PCM WAV.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        encode_pcm16_mono(&self.samples, self.sample_rate)
    }
}

/// Run the configured pipeline over `input`.
pub fn process(input: &Signal, config: &PipelineConfig) -> Result<ProcessedSignal> {
    let signal = match &config.trim {
        Some(t) => input.slice_seconds(t.start_s, t.end_s),
        None => input.clone(),
    };
    info!("Input {} Hz, frames={}", signal.sample_rate, signal.len());

    if !config.enable_dsp {
        info!("DSP disabled — trimmed audio only");
        return Ok(ProcessedSignal {
            samples: signal.samples,
            sample_rate: signal.sample_rate,
            clipped_samples: 0,
            resolved: None,
        });
    }

    let resolved = config.resolve(signal.sample_rate)?;
    for c in &resolved.corrections {
        debug!("Guard: {c}");
    }

    if signal.is_empty() {
        info!("Empty input — nothing to process");
        return Ok(ProcessedSignal {
            samples: Vec::new(),
            sample_rate: resolved.output_sample_rate,
            clipped_samples: 0,
            resolved: Some(resolved),
        });
    }

    let sr = resolved.sample_rate;
    let mut x = match &resolved.strategy {
        Strategy::FirHilbert {
            high_pass_taps,
            band_low_pass_taps,
            dc_block_taps,
            post_low_pass_taps,
        } => {
            let r0 = rms(&signal.samples);
            let x = apply_zero_phase(
                &signal.samples,
                &design_highpass(*high_pass_taps, resolved.high_pass_hz, sr)?,
            );
            let r1 = rms(&x);
            let x = apply_zero_phase(&x, &design_lowpass(*band_low_pass_taps, resolved.pre_low_pass_hz, sr)?);
            info!(
                "Band-pass HP {} → LP {} | RMS: raw={r0:.6} → HP={r1:.6} → BP={:.6}",
                resolved.high_pass_hz,
                resolved.pre_low_pass_hz,
                rms(&x)
            );

            let xh = analytic_component(&x);
            let x = hilbert_demod(&x, &xh, sr, resolved.shift_hz);
            info!("Hilbert demod @ {} Hz → baseband | RMS={:.6}", resolved.shift_hz, rms(&x));

            let x = apply_zero_phase(&x, &design_highpass(*dc_block_taps, resolved.dc_block_hz, sr)?);
            debug!("DC-block {} Hz", resolved.dc_block_hz);
            let x = apply_zero_phase(&x, &design_lowpass(*post_low_pass_taps, resolved.post_low_pass_hz, sr)?);
            info!(
                "Post-LP {} Hz ({} taps) | RMS={:.6}",
                resolved.post_low_pass_hz,
                post_low_pass_taps,
                rms(&x)
            );
            x
        }
        Strategy::IirHeterodyne { sections } => {
            let band: Vec<_> = cascade(FilterType::Highpass, resolved.high_pass_hz, *sections, sr)?
                .into_iter()
                .chain(cascade(FilterType::Lowpass, resolved.pre_low_pass_hz, *sections, sr)?)
                .collect();
            let x = apply_cascade(&signal.samples, &band);
            info!(
                "Biquad band-pass {} → {} Hz ({sections}×2 sections) | RMS={:.6}",
                resolved.high_pass_hz,
                resolved.pre_low_pass_hz,
                rms(&x)
            );

            let x = heterodyne(&x, sr, resolved.shift_hz);
            info!("Heterodyne @ {} Hz | RMS={:.6}", resolved.shift_hz, rms(&x));

            let post: Vec<_> = cascade(FilterType::Highpass, resolved.dc_block_hz, 1, sr)?
                .into_iter()
                .chain(cascade(FilterType::Lowpass, resolved.post_low_pass_hz, *sections, sr)?)
                .collect();
            let x = apply_cascade(&x, &post);
            info!(
                "DC-block {} Hz + post-LP {} Hz | RMS={:.6}",
                resolved.dc_block_hz,
                resolved.post_low_pass_hz,
                rms(&x)
            );
            x
        }
    };

    if resolved.enable_speech_enhance {
        x = adaptive_speech_lift(&x, sr, resolved.speech_target_rms);
        normalize(&mut x, SPEECH_NORMALIZE_PEAK);
        info!("Speech lift (target RMS {}) | RMS={:.6}", resolved.speech_target_rms, rms(&x));
    }

    let (mut x, clipped) = gain_db_counting(&x, resolved.gain_db);
    if clipped > 0 {
        warn!("{clipped} samples clamped after {} dB gain", resolved.gain_db);
    }
    let fade_ms = resolved.fade_ms.max(MIN_FADE_MS);
    fade(&mut x, sr, fade_ms, FadeEdge::In);
    fade(&mut x, sr, fade_ms, FadeEdge::Out);
    info!("Gain {} dB · fade {} ms", resolved.gain_db, resolved.fade_ms);

    let out_sr = resolved.output_sample_rate;
    if out_sr != sr {
        x = resample_linear(&x, sr, out_sr)?;
        info!("Resampled to {out_sr} Hz");
    }

    Ok(ProcessedSignal {
        samples: x,
        sample_rate: out_sr,
        clipped_samples: clipped,
        resolved: Some(resolved),
    })
}

/// Run the pipeline and encode the result as a 16-bit mono WAV file.
pub fn process_to_wav(input: &Signal, config: &PipelineConfig) -> Result<Vec<u8>> {
    process(input, config)?.to_wav()
}
