pub mod config;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod signal;

use crate::config::PipelineConfig;
use crate::signal::Signal;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the ultrashift-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Read a `PipelineConfig` from a JS object; `undefined`/`null` give the defaults.
fn config_from_js(config: JsValue) -> Result<PipelineConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(PipelineConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))
}

fn run(samples: Vec<f32>, sample_rate: u32, config: JsValue) -> Result<pipeline::ProcessedSignal, JsValue> {
    let config = config_from_js(config)?;
    let signal = Signal::new(samples, sample_rate).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    pipeline::process(&signal, &config).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: run the pipeline over decoded mono samples.
/// Returns `{ samples, sampleRate, clippedSamples }` for playback.
#[wasm_bindgen]
pub fn process_samples(samples: Vec<f32>, sample_rate: u32, config: JsValue) -> Result<JsValue, JsValue> {
    let processed = run(samples, sample_rate, config)?;
    serde_wasm_bindgen::to_value(&processed).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: run the pipeline and return a 16-bit mono WAV byte array.
#[wasm_bindgen]
pub fn process_wav(samples: Vec<f32>, sample_rate: u32, config: JsValue) -> Result<Vec<u8>, JsValue> {
    run(samples, sample_rate, config)?
        .to_wav()
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}
