//! Heuristic crossfade-length estimation.
//!
//! Larger tempo and key gaps, and louder material around the seam, justify
//! longer blends; rounding to a phrase multiple keeps the result alignable.

use tracing::debug;

use crate::{
    harmony::nearest_semitone_delta,
    model::{DEFAULT_SECTION_LOUDNESS_DB, DEFAULT_TEMPO_BPM, Section, TrackAnalysis},
};

pub const DEFAULT_MIN_BEATS: u32 = 8;
pub const DEFAULT_MAX_BEATS: u32 = 128;

/// Seconds of material inspected at the seam of each track.
const SEAM_WINDOW_SECONDS: f64 = 16.0;

/// Propose a musically appropriate crossfade length in beats.
///
/// The result is always a multiple of 4, at least 4 before clamping, and
/// clamped to `[min_beats, max_beats]` (defaults 8/128 when unset; the
/// upper bound never drops below the lower).
#[must_use]
pub fn estimate(
    analysis_a: &TrackAnalysis,
    analysis_b: &TrackAnalysis,
    min_beats: Option<u32>,
    max_beats: Option<u32>,
) -> u32 {
    let tempo_a = analysis_a.tempo.unwrap_or(DEFAULT_TEMPO_BPM);
    let tempo_b = analysis_b.tempo.unwrap_or(DEFAULT_TEMPO_BPM);
    let tempo_diff = (tempo_a - tempo_b).abs();

    let key_diff = f64::from(nearest_semitone_delta(analysis_a.key, analysis_b.key).abs());

    let outro_start = analysis_a.track_duration - SEAM_WINDOW_SECONDS;
    let loud_a = average_loudness(
        &analysis_a.sections,
        outro_start,
        analysis_a.track_duration,
    );
    let loud_b = average_loudness(&analysis_b.sections, 0.0, SEAM_WINDOW_SECONDS);
    let energy_factor = (-loud_a + -loud_b) / 20.0;

    let raw_beats = 16.0
        + (tempo_diff / 6.0).round()
        + (key_diff / 2.0).round()
        + (energy_factor * 4.0).round();

    let phrase_rounded = ((raw_beats / 4.0).round() * 4.0).max(4.0) as u32;

    let min = min_beats.unwrap_or(DEFAULT_MIN_BEATS);
    let max = max_beats.unwrap_or(DEFAULT_MAX_BEATS).max(min);
    let beats = phrase_rounded.clamp(min, max);

    debug!(
        tempo_diff,
        key_diff, energy_factor, raw_beats, beats, "smart length estimated"
    );
    beats
}

/// Average loudness of sections overlapping `[range_start, range_end)`,
/// or the default seam loudness when none do.
fn average_loudness(sections: &[Section], range_start: f64, range_end: f64) -> f64 {
    let overlapping: Vec<f64> = sections
        .iter()
        .filter(|section| {
            section.start + section.duration > range_start && section.start < range_end
        })
        .map(|section| section.loudness)
        .collect();

    if overlapping.is_empty() {
        return DEFAULT_SECTION_LOUDNESS_DB;
    }

    overlapping.iter().sum::<f64>() / overlapping.len() as f64
}
