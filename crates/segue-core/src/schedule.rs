//! Automation keyframe generation.
//!
//! One expansion of a plan into time-ordered keyframes serves both the
//! real-time preview and the offline render; the paths differ only in the
//! time origin added to the offsets and in the total render length.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    curves::{XfadeCurve, ease_in_cubic, ease_out_cubic},
    harmony::ratio_from_semitones,
    model::{TrackAnalysis, TransitionPlan},
};

/// Added to "now" when scheduling the real-time preview.
pub const LIVE_SCHEDULING_LATENCY_SECONDS: f64 = 0.06;
/// Fixed epoch the offline render starts from.
pub const OFFLINE_RENDER_EPOCH_SECONDS: f64 = 0.05;
/// Deck B keeps playing this long past the crossfade in an offline render.
pub const OFFLINE_TAIL_SECONDS: f64 = 8.0;

/// Playback-rate bounds; resampling outside ±6% is audible.
pub const RATE_CLAMP_MIN: f64 = 0.94;
pub const RATE_CLAMP_MAX: f64 = 1.06;

/// Settle window that pins the gains after the crossfade ends.
const SETTLE_SECONDS: f64 = 0.01;

const HIGHPASS_A_SWEEP_HZ: (f32, f32) = (30.0, 220.0);
const LOWPASS_B_SWEEP_HZ: (f32, f32) = (4_000.0, 20_000.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    pub curve: XfadeCurve,
    /// Shelving EQ automation: bass ducked on both decks early, released
    /// on B as the transition completes.
    pub eq_enable: bool,
    /// Low-shelf duck target, dB. Expected non-positive.
    pub eq_low_duck_db: f32,
    /// High-shelf boost target on deck B, dB.
    pub eq_high_boost_db: f32,
    /// DJ-style spectral handoff: high-pass sweep on A, low-pass on B.
    pub filter_swap: bool,
    /// Ramp playback rates across the window instead of applying the
    /// target rate as a constant.
    pub tempo_ramp: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            curve: XfadeCurve::default(),
            eq_enable: false,
            eq_low_duck_db: -12.0,
            eq_high_boost_db: 6.0,
            filter_swap: false,
            tempo_ramp: false,
        }
    }
}

/// Shelving-EQ gains at one keyframe, dB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EqFrame {
    pub low_shelf_a_db: f32,
    pub high_shelf_b_db: f32,
    pub low_shelf_b_db: f32,
}

/// Filter cutoffs at one keyframe, Hz.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FilterFrame {
    pub highpass_a_hz: f32,
    pub lowpass_b_hz: f32,
}

/// One automation keyframe. Consumers interpolate linearly between
/// consecutive keyframes and hold the last one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    /// Seconds from the schedule's time origin.
    pub offset_seconds: f64,
    /// Normalized crossfade progress in [0, 1].
    pub progress: f64,
    pub gain_a: f32,
    pub gain_b: f32,
    pub rate_a: f64,
    pub rate_b: f64,
    pub eq: Option<EqFrame>,
    pub filters: Option<FilterFrame>,
}

/// Expand a plan into `step_count + 1` window keyframes plus the closing
/// pair that pins gain A to 0 and gain B to 1.
///
/// Offsets start at zero; shift them with [`with_time_origin`].
#[instrument(skip(plan, analysis_a, analysis_b, options), fields(step_count))]
#[must_use]
pub fn schedule(
    plan: &TransitionPlan,
    analysis_a: &TrackAnalysis,
    analysis_b: &TrackAnalysis,
    options: &RenderOptions,
    step_count: u32,
) -> Vec<Keyframe> {
    let steps = step_count.max(1);
    let duration = plan.xfade_duration;

    let rates_a = RateSpan::derive(
        plan.target_tempo_a,
        analysis_a.tempo_or_default(),
        plan.pitch_semis_a,
        options.tempo_ramp,
    );
    let rates_b = RateSpan::derive(
        plan.target_tempo_b,
        analysis_b.tempo_or_default(),
        plan.pitch_semis_b,
        options.tempo_ramp,
    );

    let mut frames = Vec::with_capacity(steps as usize + 3);
    for i in 0..=steps {
        let progress = f64::from(i) / f64::from(steps);
        frames.push(window_frame(progress, duration, options, rates_a, rates_b));
    }

    // Two closing keyframes: a 10 ms settle ramp to the forced endpoint,
    // then a hold, so the transition terminates cleanly regardless of the
    // curve's own endpoint values.
    for settle in [SETTLE_SECONDS, 2.0 * SETTLE_SECONDS] {
        let mut frame = window_frame(1.0, duration, options, rates_a, rates_b);
        frame.offset_seconds = duration + settle;
        frame.gain_a = 0.0;
        frame.gain_b = 1.0;
        frames.push(frame);
    }

    debug!(frames = frames.len(), duration, "automation scheduled");
    frames
}

/// Shift every keyframe offset by a time origin (preview: now plus
/// scheduling latency; offline: the fixed render epoch).
#[must_use]
pub fn with_time_origin(frames: &[Keyframe], origin_seconds: f64) -> Vec<Keyframe> {
    frames
        .iter()
        .map(|frame| Keyframe {
            offset_seconds: frame.offset_seconds + origin_seconds,
            ..*frame
        })
        .collect()
}

/// Total offline render length for a plan: window plus tail.
#[must_use]
pub fn offline_render_seconds(plan: &TransitionPlan) -> f64 {
    OFFLINE_RENDER_EPOCH_SECONDS + plan.xfade_duration + OFFLINE_TAIL_SECONDS
}

#[derive(Debug, Clone, Copy)]
struct RateSpan {
    start: f64,
    end: f64,
}

impl RateSpan {
    /// Base rate carries only the harmonic detune; the target folds in the
    /// tempo correction. Both are clamped so no emitted rate ever leaves
    /// the safe band, even mid-ramp.
    fn derive(target_tempo: f64, source_tempo: f64, pitch_semis: f64, ramp: bool) -> Self {
        let pitch_ratio = ratio_from_semitones(pitch_semis);
        let target = clamp_rate((target_tempo / source_tempo) * pitch_ratio);
        let start = if ramp { clamp_rate(pitch_ratio) } else { target };
        Self { start, end: target }
    }

    fn at(self, progress: f64) -> f64 {
        self.start + (self.end - self.start) * progress
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if !rate.is_finite() {
        return 1.0;
    }
    rate.clamp(RATE_CLAMP_MIN, RATE_CLAMP_MAX)
}

fn window_frame(
    progress: f64,
    duration: f64,
    options: &RenderOptions,
    rates_a: RateSpan,
    rates_b: RateSpan,
) -> Keyframe {
    let p = progress as f32;
    let (gain_a, gain_b) = options.curve.gains(p);

    let eq = options.eq_enable.then(|| EqFrame {
        low_shelf_a_db: options.eq_low_duck_db * ease_out_cubic(p),
        high_shelf_b_db: options.eq_high_boost_db * ease_in_cubic(p),
        // The secondary duck ignores positive targets rather than
        // reinterpreting them as a boost.
        low_shelf_b_db: options.eq_low_duck_db.min(0.0) * (1.0 - ease_in_cubic(p)),
    });

    let filters = options.filter_swap.then(|| FilterFrame {
        highpass_a_hz: HIGHPASS_A_SWEEP_HZ.0
            + (HIGHPASS_A_SWEEP_HZ.1 - HIGHPASS_A_SWEEP_HZ.0) * ease_out_cubic(p),
        lowpass_b_hz: LOWPASS_B_SWEEP_HZ.0
            + (LOWPASS_B_SWEEP_HZ.1 - LOWPASS_B_SWEEP_HZ.0) * ease_in_cubic(p),
    });

    Keyframe {
        offset_seconds: progress * duration,
        progress,
        gain_a: gain_a.clamp(0.0, 1.0),
        gain_b: gain_b.clamp(0.0, 1.0),
        rate_a: rates_a.at(progress),
        rate_b: rates_b.at(progress),
        eq,
        filters,
    }
}
