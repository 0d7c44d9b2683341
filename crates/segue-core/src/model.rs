use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
pub const DEFAULT_TIME_SIGNATURE: u32 = 4;
pub const FALLBACK_TRACK_DURATION_SECONDS: f64 = 180.0;
pub const DEFAULT_SECTION_LOUDNESS_DB: f64 = -10.0;
pub const PHRASE_BARS: usize = 4;

/// A single detected beat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Beat {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
}

/// A single detected bar (measure).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub start: f64,
    pub duration: f64,
}

/// A structural section with an average loudness in dB (typically negative).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub start: f64,
    pub duration: f64,
    pub loudness: f64,
}

/// Normalized rhythmic/harmonic analysis of one track.
///
/// Immutable after construction. Missing source fields degrade to the
/// documented defaults instead of failing; see [`crate::ingest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackAnalysis {
    pub tempo: Option<f64>,
    /// Pitch-class index, 0 = C .. 11 = B.
    pub key: Option<u8>,
    pub mode: Option<u8>,
    #[serde(default = "default_time_signature")]
    pub time_signature: u32,
    #[serde(default)]
    pub beats: Vec<Beat>,
    #[serde(default)]
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default = "default_track_duration")]
    pub track_duration: f64,
}

impl Default for TrackAnalysis {
    fn default() -> Self {
        Self {
            tempo: None,
            key: None,
            mode: None,
            time_signature: DEFAULT_TIME_SIGNATURE,
            beats: Vec::new(),
            bars: Vec::new(),
            sections: Vec::new(),
            track_duration: FALLBACK_TRACK_DURATION_SECONDS,
        }
    }
}

impl TrackAnalysis {
    /// Bar start times when bars are known, else every
    /// `time_signature`-th beat start, else a single origin downbeat.
    ///
    /// Recomputed on every call from the analysis content.
    #[must_use]
    pub fn downbeats(&self) -> Vec<f64> {
        if !self.bars.is_empty() {
            return self.bars.iter().map(|bar| bar.start).collect();
        }

        if !self.beats.is_empty() {
            let step = self.time_signature.max(1) as usize;
            return self
                .beats
                .iter()
                .step_by(step)
                .map(|beat| beat.start)
                .collect();
        }

        vec![0.0]
    }

    /// Every fourth bar start (4-bar phrases), falling back to
    /// [`Self::downbeats`] when no bars are known.
    #[must_use]
    pub fn phrase_starts(&self) -> Vec<f64> {
        if self.bars.is_empty() {
            return self.downbeats();
        }

        self.bars
            .iter()
            .step_by(PHRASE_BARS)
            .map(|bar| bar.start)
            .collect()
    }

    #[must_use]
    pub fn tempo_or_default(&self) -> f64 {
        self.tempo.unwrap_or(DEFAULT_TEMPO_BPM)
    }
}

/// Immutable transition plan, produced once per planning call.
///
/// Every field is numeric; degenerate analysis input yields fallback
/// values rather than absent ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TransitionPlan {
    /// Seek offset into deck A's decoded buffer, seconds.
    pub start_a: f64,
    /// Seek offset into deck B's decoded buffer, seconds.
    pub start_b: f64,
    /// Crossfade window length, seconds. Always positive.
    pub xfade_duration: f64,
    /// Tempo deck A is driven toward, BPM.
    pub target_tempo_a: f64,
    /// Tempo deck B is driven toward, BPM.
    pub target_tempo_b: f64,
    /// Crossfade length in beats, for display and diagnostics.
    pub chosen_beats: u32,
    /// Harmonic detune applied to deck A, semitones.
    pub pitch_semis_a: f64,
    /// Harmonic detune applied to deck B, semitones.
    pub pitch_semis_b: f64,
}

const fn default_time_signature() -> u32 {
    DEFAULT_TIME_SIGNATURE
}

const fn default_track_duration() -> f64 {
    FALLBACK_TRACK_DURATION_SECONDS
}
