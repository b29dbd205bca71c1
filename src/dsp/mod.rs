//! DSP primitives — windowed-sinc FIRs, Hilbert demodulation, biquads,
//! dynamics, resampling, and WAV encoding.
//!
//! Every function here works on a complete in-memory buffer and is
//! deterministic: the same input always yields bit-identical output.

pub mod analysis;
pub mod dynamics;
pub mod filter;
pub mod fir;
pub mod hilbert;
pub mod resample;
pub mod shift;
pub mod wav;
pub mod window;
