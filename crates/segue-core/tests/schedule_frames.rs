use segue_core::{
    curves::XfadeCurve,
    model::TrackAnalysis,
    planner::{PlanOptions, TempoStrategy, plan},
    schedule::{
        OFFLINE_RENDER_EPOCH_SECONDS, RATE_CLAMP_MAX, RATE_CLAMP_MIN, RenderOptions, schedule,
        with_time_origin,
    },
};

fn analysis(tempo: f64, key: Option<u8>) -> TrackAnalysis {
    TrackAnalysis {
        tempo: Some(tempo),
        key,
        track_duration: 240.0,
        ..TrackAnalysis::default()
    }
}

fn plan_and_schedule(
    tempo_a: f64,
    tempo_b: f64,
    strategy: TempoStrategy,
    options: &RenderOptions,
    steps: u32,
) -> Vec<segue_core::Keyframe> {
    let a = analysis(tempo_a, None);
    let b = analysis(tempo_b, None);
    let plan = plan(&a, &b, 16, strategy, &PlanOptions::default());
    schedule(&plan, &a, &b, options, steps)
}

#[test]
fn frames_are_strictly_time_ordered_and_end_pinned() {
    let frames = plan_and_schedule(
        120.0,
        128.0,
        TempoStrategy::MatchBToA,
        &RenderOptions::default(),
        64,
    );

    assert_eq!(frames.len(), 64 + 1 + 2);
    for pair in frames.windows(2) {
        assert!(pair[1].offset_seconds > pair[0].offset_seconds);
    }

    // The closing pair pins the endpoint regardless of curve residuals.
    let settle = &frames[frames.len() - 2];
    let hold = &frames[frames.len() - 1];
    for frame in [settle, hold] {
        assert_eq!(frame.gain_a, 0.0);
        assert_eq!(frame.gain_b, 1.0);
    }
}

#[test]
fn gains_are_clamped_to_unit_range() {
    for curve in [
        XfadeCurve::EqualPower,
        XfadeCurve::Linear,
        XfadeCurve::Rise,
        XfadeCurve::DjS,
    ] {
        let options = RenderOptions {
            curve,
            ..RenderOptions::default()
        };
        let frames =
            plan_and_schedule(120.0, 120.0, TempoStrategy::KeepOwn, &options, 32);
        for frame in &frames {
            assert!((0.0..=1.0).contains(&frame.gain_a));
            assert!((0.0..=1.0).contains(&frame.gain_b));
        }
    }
}

#[test]
fn extreme_tempo_matching_never_escapes_the_rate_band() {
    // 60 -> 200 BPM would need a 3.33x rate; it must cap at +/-6%.
    let frames = plan_and_schedule(
        60.0,
        200.0,
        TempoStrategy::MatchBToA,
        &RenderOptions {
            tempo_ramp: true,
            ..RenderOptions::default()
        },
        128,
    );

    for frame in &frames {
        assert!((RATE_CLAMP_MIN..=RATE_CLAMP_MAX).contains(&frame.rate_a));
        assert!((RATE_CLAMP_MIN..=RATE_CLAMP_MAX).contains(&frame.rate_b));
    }
}

#[test]
fn tempo_ramp_moves_from_base_to_target() {
    let options = RenderOptions {
        tempo_ramp: true,
        ..RenderOptions::default()
    };
    let frames = plan_and_schedule(100.0, 104.0, TempoStrategy::MatchBToA, &options, 16);

    // No detune, so B starts at the pitch-only base rate of 1.0 and
    // lands on the tempo-corrected 100/104.
    let first = frames.first().expect("schedule is never empty");
    let window_end = &frames[frames.len() - 3];
    assert!((first.rate_b - 1.0).abs() < 1e-9);
    assert!((window_end.rate_b - 100.0 / 104.0).abs() < 1e-9);
}

#[test]
fn constant_rate_applies_the_target_throughout() {
    let options = RenderOptions {
        tempo_ramp: false,
        ..RenderOptions::default()
    };
    let frames = plan_and_schedule(100.0, 104.0, TempoStrategy::MatchBToA, &options, 16);

    let target = 100.0 / 104.0;
    for frame in &frames {
        assert!((frame.rate_b - target).abs() < 1e-9);
    }
}

#[test]
fn eq_automation_ducks_bass_and_releases_b() {
    let options = RenderOptions {
        eq_enable: true,
        eq_low_duck_db: -12.0,
        eq_high_boost_db: 6.0,
        ..RenderOptions::default()
    };
    let frames = plan_and_schedule(120.0, 120.0, TempoStrategy::KeepOwn, &options, 8);

    let start = frames.first().expect("schedule is never empty");
    let start_eq = start.eq.expect("eq frames are enabled");
    assert_eq!(start_eq.low_shelf_a_db, 0.0);
    assert_eq!(start_eq.high_shelf_b_db, 0.0);
    assert_eq!(start_eq.low_shelf_b_db, -12.0);

    let end = &frames[frames.len() - 1];
    let end_eq = end.eq.expect("eq frames are enabled");
    assert!((end_eq.low_shelf_a_db - -12.0).abs() < 1e-5);
    assert!((end_eq.high_shelf_b_db - 6.0).abs() < 1e-5);
    assert!(end_eq.low_shelf_b_db.abs() < 1e-5);
}

#[test]
fn positive_duck_values_are_ignored_not_boosted() {
    let options = RenderOptions {
        eq_enable: true,
        eq_low_duck_db: 6.0,
        ..RenderOptions::default()
    };
    let frames = plan_and_schedule(120.0, 120.0, TempoStrategy::KeepOwn, &options, 8);

    for frame in &frames {
        let eq = frame.eq.expect("eq frames are enabled");
        assert_eq!(eq.low_shelf_b_db, 0.0);
    }
}

#[test]
fn filter_swap_sweeps_both_cutoffs() {
    let options = RenderOptions {
        filter_swap: true,
        ..RenderOptions::default()
    };
    let frames = plan_and_schedule(120.0, 120.0, TempoStrategy::KeepOwn, &options, 8);

    let start = frames.first().expect("schedule is never empty").filters;
    let start = start.expect("filter frames are enabled");
    assert_eq!(start.highpass_a_hz, 30.0);
    assert_eq!(start.lowpass_b_hz, 4_000.0);

    let end = frames[frames.len() - 1]
        .filters
        .expect("filter frames are enabled");
    assert!((end.highpass_a_hz - 220.0).abs() < 1e-2);
    assert!((end.lowpass_b_hz - 20_000.0).abs() < 1e-1);
}

#[test]
fn auxiliary_frames_are_absent_when_disabled() {
    let frames = plan_and_schedule(
        120.0,
        120.0,
        TempoStrategy::KeepOwn,
        &RenderOptions::default(),
        8,
    );
    for frame in &frames {
        assert!(frame.eq.is_none());
        assert!(frame.filters.is_none());
    }
}

#[test]
fn zero_step_count_still_covers_the_window() {
    let frames = plan_and_schedule(
        120.0,
        120.0,
        TempoStrategy::KeepOwn,
        &RenderOptions::default(),
        0,
    );
    // One step minimum: both window endpoints plus the closing pair.
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0].progress, 0.0);
    assert_eq!(frames[1].progress, 1.0);
}

#[test]
fn time_origin_shift_is_uniform() {
    let frames = plan_and_schedule(
        120.0,
        120.0,
        TempoStrategy::KeepOwn,
        &RenderOptions::default(),
        8,
    );
    let shifted = with_time_origin(&frames, OFFLINE_RENDER_EPOCH_SECONDS);

    for (original, moved) in frames.iter().zip(&shifted) {
        let delta = moved.offset_seconds - original.offset_seconds;
        assert!((delta - OFFLINE_RENDER_EPOCH_SECONDS).abs() < 1e-12);
        assert_eq!(original.gain_a, moved.gain_a);
        assert_eq!(original.gain_b, moved.gain_b);
    }
}
