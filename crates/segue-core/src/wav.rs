//! Canonical PCM16 WAV serialization.
//!
//! A pure byte-level transform: per-channel float buffers in, a complete
//! RIFF/WAVE byte buffer out (44-byte header, interleaved little-endian
//! 16-bit samples). No I/O beyond the optional file-writing wrapper.

use std::{fs, io::Cursor, path::Path};

use anyhow::{Context, Result};
use tracing::{info, instrument};

/// Encode per-channel samples into a 16-bit PCM WAV byte buffer.
///
/// Inputs are clamped to `[-1.0, 1.0]`. Channels of unequal length are
/// zero-padded to the longest.
pub fn encode_wav_pcm16(channels: &[Vec<f32>], sample_rate: u32) -> Result<Vec<u8>> {
    if channels.is_empty() {
        return Err(anyhow::anyhow!("wav encoding requires at least one channel"));
    }
    let channel_count =
        u16::try_from(channels.len()).context("too many channels for wav encoding")?;

    let spec = hound::WavSpec {
        channels: channel_count,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("failed to start wav stream")?;
        for frame in 0..frames {
            for channel in channels {
                let sample = channel.get(frame).copied().unwrap_or(0.0);
                writer
                    .write_sample(quantize_pcm16(sample))
                    .context("failed to write wav sample")?;
            }
        }
        writer.finalize().context("failed to finalize wav stream")?;
    }

    Ok(cursor.into_inner())
}

#[instrument(skip(channels), fields(path = %path.display(), sample_rate))]
pub fn write_wav(path: &Path, channels: &[Vec<f32>], sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create wav output directory: {}",
                parent.display()
            )
        })?;
    }

    let bytes = encode_wav_pcm16(channels, sample_rate)?;
    fs::write(path, bytes)
        .with_context(|| format!("failed to write wav file: {}", path.display()))?;
    info!("wav written");
    Ok(())
}

/// Clamp to [-1, 1], then scale negative samples by 0x8000 and
/// non-negative ones by 0x7FFF, rounding half away from zero.
fn quantize_pcm16(sample: f32) -> i16 {
    let clamped = f64::from(sample.clamp(-1.0, 1.0));
    let scaled = if clamped < 0.0 {
        clamped * 32768.0
    } else {
        clamped * 32767.0
    };
    scaled.round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_matches_the_asymmetric_scale() {
        assert_eq!(quantize_pcm16(0.0), 0);
        assert_eq!(quantize_pcm16(0.5), 16384);
        assert_eq!(quantize_pcm16(-0.5), -16384);
        assert_eq!(quantize_pcm16(1.0), 32767);
        assert_eq!(quantize_pcm16(-1.0), -32768);
        assert_eq!(quantize_pcm16(2.0), 32767);
        assert_eq!(quantize_pcm16(-2.0), -32768);
    }

    #[test]
    fn encoding_rejects_zero_channels() {
        assert!(encode_wav_pcm16(&[], 44_100).is_err());
    }

    #[test]
    fn header_is_exactly_44_bytes_before_data() {
        let bytes = encode_wav_pcm16(&[vec![0.0; 4], vec![0.0; 4]], 44_100)
            .expect("stereo encode should succeed");
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 4 * 2 * 2);
    }

    #[test]
    fn unequal_channels_are_zero_padded() {
        let bytes = encode_wav_pcm16(&[vec![1.0, 1.0], vec![1.0]], 8_000)
            .expect("encode should succeed");
        // Frame 2, channel 2 is the padded sample.
        assert_eq!(&bytes[bytes.len() - 2..], &[0, 0]);
    }
}
