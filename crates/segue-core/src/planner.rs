//! Transition planning: aligned start points, crossfade duration, tempo
//! targets, and harmonic detune, assembled into an immutable plan.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    harmony::nearest_semitone_delta,
    length,
    model::{TrackAnalysis, TransitionPlan},
    time::{beats_to_seconds, phrase_seconds},
};

/// Seconds kept free at the end of deck A past the crossfade window.
pub const SAFETY_MARGIN_SECONDS: f64 = 5.0;

pub const DEFAULT_MAX_DETUNE_SEMIS: f64 = 2.0;

const MANUAL_MIN_BEATS: u32 = 1;
const MANUAL_MAX_BEATS: u32 = 1024;
const MANUAL_MIN_BEATS_CEILING: u32 = 512;

/// How the two decks' tempos converge during the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TempoStrategy {
    /// Each deck keeps its own tempo.
    #[default]
    KeepOwn,
    /// Deck B is driven toward deck A's tempo.
    MatchBToA,
    /// Deck A is driven toward deck B's tempo.
    MatchAToB,
    /// Both decks meet at the mean tempo.
    Average,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Derive the crossfade length from musical structure instead of the
    /// requested beat count.
    pub smart_length: bool,
    /// Snap the crossfade window to 4-beat phrase multiples and prefer
    /// phrase starts as seek points.
    pub phrase_align: bool,
    /// Detune deck B toward deck A's key.
    pub harmonic_match: bool,
    /// Upper bound for the applied detune, semitones. Clamped to [0, 6].
    pub max_detune_semis: f64,
    pub min_beats: Option<u32>,
    pub max_beats: Option<u32>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            smart_length: false,
            phrase_align: false,
            harmonic_match: false,
            max_detune_semis: DEFAULT_MAX_DETUNE_SEMIS,
            min_beats: None,
            max_beats: None,
        }
    }
}

/// Produce a transition plan for an A→B crossfade.
///
/// Never fails: degenerate analysis content falls back to documented
/// defaults, and every plan field is a finite number.
#[instrument(skip(analysis_a, analysis_b, options), fields(beats_length, strategy = ?strategy))]
#[must_use]
pub fn plan(
    analysis_a: &TrackAnalysis,
    analysis_b: &TrackAnalysis,
    beats_length: u32,
    strategy: TempoStrategy,
    options: &PlanOptions,
) -> TransitionPlan {
    let tempo_a = analysis_a.tempo_or_default();
    let tempo_b = analysis_b.tempo_or_default();

    let (target_tempo_a, target_tempo_b) = match strategy {
        TempoStrategy::KeepOwn => (tempo_a, tempo_b),
        TempoStrategy::MatchBToA => (tempo_a, tempo_a),
        TempoStrategy::MatchAToB => (tempo_b, tempo_b),
        TempoStrategy::Average => {
            let mean = (tempo_a + tempo_b) / 2.0;
            (mean, mean)
        }
    };

    let mut chosen_beats = if options.smart_length {
        length::estimate(analysis_a, analysis_b, options.min_beats, options.max_beats)
    } else {
        let min = options
            .min_beats
            .unwrap_or(MANUAL_MIN_BEATS)
            .clamp(MANUAL_MIN_BEATS, MANUAL_MIN_BEATS_CEILING);
        let max = options.max_beats.unwrap_or(MANUAL_MAX_BEATS).max(min);
        beats_length.clamp(min, max)
    };

    // The slower resulting tempo owns the beat span so a tempo-lengthened
    // beat does not truncate the blend.
    let slower_tempo = target_tempo_a.min(target_tempo_b);
    let mut xfade_duration = beats_to_seconds(f64::from(chosen_beats), slower_tempo);

    if options.phrase_align {
        let phrase_span = phrase_seconds(slower_tempo);
        let phrases = (xfade_duration / phrase_span).round().max(1.0);
        xfade_duration = phrases * phrase_span;
        chosen_beats = phrases as u32 * 4;
    }

    let (start_a, start_b) = select_starts(analysis_a, analysis_b, xfade_duration, options);

    let (pitch_semis_a, pitch_semis_b) = if options.harmonic_match
        && analysis_a.key.is_some()
        && analysis_b.key.is_some()
    {
        let delta = f64::from(nearest_semitone_delta(analysis_a.key, analysis_b.key));
        let bound = options.max_detune_semis.clamp(0.0, 6.0);
        (0.0, delta.clamp(-bound, bound))
    } else {
        (0.0, 0.0)
    };

    let plan = TransitionPlan {
        start_a,
        start_b,
        xfade_duration,
        target_tempo_a,
        target_tempo_b,
        chosen_beats,
        pitch_semis_a,
        pitch_semis_b,
    };
    debug!(
        start_a = plan.start_a,
        start_b = plan.start_b,
        xfade_duration = plan.xfade_duration,
        chosen_beats = plan.chosen_beats,
        pitch_semis_b = plan.pitch_semis_b,
        "transition planned"
    );
    plan
}

fn select_starts(
    analysis_a: &TrackAnalysis,
    analysis_b: &TrackAnalysis,
    xfade_duration: f64,
    options: &PlanOptions,
) -> (f64, f64) {
    let duration_a = analysis_a.track_duration;

    // Latest downbeat of A that leaves room for the window plus margin.
    let limit = duration_a - xfade_duration - SAFETY_MARGIN_SECONDS;
    let fallback_start_a = limit.max(0.0);
    let start_a = analysis_a
        .downbeats()
        .into_iter()
        .filter(|&downbeat| downbeat < limit)
        .next_back()
        .unwrap_or(fallback_start_a);

    let start_b = analysis_b.downbeats().first().copied().unwrap_or(0.0);

    if !options.phrase_align {
        return (start_a, start_b);
    }

    // Phrase mode keeps the non-phrase choice as its fallback even when a
    // short track leaves no phrase inside the margin.
    let phrase_start_a = analysis_a
        .phrase_starts()
        .into_iter()
        .filter(|&start| start + xfade_duration <= duration_a - SAFETY_MARGIN_SECONDS)
        .next_back()
        .unwrap_or(start_a);
    let phrase_start_b = analysis_b
        .phrase_starts()
        .first()
        .copied()
        .unwrap_or(start_b);

    (phrase_start_a, phrase_start_b)
}
