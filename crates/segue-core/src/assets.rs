//! Decoded audio buffers and track-library scanning.
//!
//! The planner itself never touches samples; these are the host-side
//! collaborators that supply per-channel buffers and pair audio files with
//! their analysis sidecars.

use std::{collections::BTreeSet, fs::File, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Suffix an analysis sidecar carries next to its audio file.
pub const ANALYSIS_SIDECAR_SUFFIX: &str = ".analysis.json";

/// One deck's decoded audio: per-channel sample buffers at a single rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DeckAudio {
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        crate::time::frames_to_seconds(self.frame_count() as u64, self.sample_rate)
    }

    /// Sample at `(channel, frame)`, reusing channel 0 for missing
    /// channels and silence past the end.
    #[must_use]
    pub fn sample(&self, channel: usize, frame: usize) -> f32 {
        let channel = self
            .channels
            .get(channel)
            .or_else(|| self.channels.first());
        channel
            .and_then(|samples| samples.get(frame))
            .copied()
            .unwrap_or(0.0)
    }
}

/// A library audio file, optionally paired with its analysis sidecar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryEntry {
    pub audio_path: String,
    pub extension: String,
    pub size_bytes: u64,
    pub analysis_path: Option<String>,
}

#[instrument(fields(path = %path.display()))]
pub fn decode_audio_file(path: &Path) -> Result<DeckAudio> {
    let file = File::open(path)
        .with_context(|| format!("failed to open audio file: {}", path.display()))?;
    let source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|value| value.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default audio track found in {}", path.display()))?;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(error)) if error.kind() == ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                return Err(anyhow::anyhow!(
                    "audio stream reset required for {}",
                    path.display()
                ));
            }
            Err(error) => return Err(error.into()),
        };

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => {
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        sample_rate = decoded.spec().rate;
        push_channel_samples(decoded, &mut channels);
    }

    if channels.iter().all(Vec::is_empty) {
        return Err(anyhow::anyhow!(
            "decoded zero samples from {}",
            path.display()
        ));
    }

    debug!(
        sample_rate,
        channels = channels.len(),
        frames = channels.first().map_or(0, Vec::len),
        "audio decode complete"
    );

    Ok(DeckAudio {
        sample_rate,
        channels,
    })
}

/// Scan a directory tree for supported audio files, pairing each with its
/// `.analysis.json` sidecar when present. Results are path-sorted.
#[instrument(fields(directory = %directory.display()))]
pub fn scan_track_library(directory: &Path) -> Result<Vec<LibraryEntry>> {
    if !directory.is_dir() {
        return Err(anyhow::anyhow!(
            "track library path is not a directory: {}",
            directory.display()
        ));
    }

    let extensions = supported_audio_extensions();
    let mut entries = Vec::new();

    for entry in WalkDir::new(directory).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(?error, "ignoring unreadable entry while scanning library");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let extension = entry
            .path()
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase());
        let Some(extension) = extension else {
            continue;
        };
        if !extensions.contains(extension.as_str()) {
            continue;
        }

        let stem = entry
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let sidecar = entry
            .path()
            .with_file_name(format!("{stem}{ANALYSIS_SIDECAR_SUFFIX}"));

        let size_bytes = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
        entries.push(LibraryEntry {
            audio_path: entry.path().display().to_string(),
            extension,
            size_bytes,
            analysis_path: sidecar
                .is_file()
                .then(|| sidecar.display().to_string()),
        });
    }

    entries.sort_by(|left, right| left.audio_path.cmp(&right.audio_path));
    debug!(count = entries.len(), "track library scan complete");
    Ok(entries)
}

fn push_channel_samples(
    decoded: symphonia::core::audio::AudioBufferRef<'_>,
    channels: &mut Vec<Vec<f32>>,
) {
    let spec = *decoded.spec();
    let channel_count = spec.channels.count().max(1);
    if channels.len() < channel_count {
        channels.resize_with(channel_count, Vec::new);
    }

    let mut sample_buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    sample_buffer.copy_interleaved_ref(decoded);

    for frame in sample_buffer.samples().chunks(channel_count) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }
}

fn supported_audio_extensions() -> BTreeSet<&'static str> {
    [
        "wav", "flac", "mp3", "ogg", "m4a", "aiff", "aif", "caf", "mkv",
    ]
    .into_iter()
    .collect()
}
