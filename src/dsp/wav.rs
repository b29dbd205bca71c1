//! WAV encoder — canonical 44-byte header + 16-bit mono PCM.

use crate::error::{DemodError, Result};

const WAV_HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Quantize one sample to signed 16-bit, clamping to `[-1, 1]` first.
/// Negative values scale by 32768, the rest by 32767; the fraction is truncated.
#[inline]
pub fn quantize_pcm16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Byte rate, data size and RIFF size for `len` samples at `sample_rate`.
/// Fails when any of them does not fit the header's 32-bit fields.
fn header_sizes(len: usize, sample_rate: u32) -> Result<(u32, u32, u32)> {
    let block_align = (CHANNELS * (BITS_PER_SAMPLE / 8)) as u32;
    let byte_rate = sample_rate
        .checked_mul(block_align)
        .ok_or_else(|| DemodError::invalid(format!("sample rate {sample_rate} Hz is too high for a WAV header")))?;
    let data_size = len
        .checked_mul(block_align as usize)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| DemodError::invalid(format!("{len} samples do not fit in a WAV data chunk")))?;
    let file_size = data_size
        .checked_add(36)
        .ok_or_else(|| DemodError::invalid(format!("{len} samples do not fit in a WAV file")))?;
    Ok((byte_rate, data_size, file_size))
}

/// Encode mono float samples as a 16-bit PCM WAV byte buffer.
pub fn encode_pcm16_mono(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let (byte_rate, data_size, file_size) = header_sizes(samples.len(), sample_rate)?;
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&quantize_pcm16(sample).to_le_bytes());
    }

    Ok(buf)
}
