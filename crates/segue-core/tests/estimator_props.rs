use proptest::prelude::*;
use segue_core::{
    harmony::nearest_semitone_delta,
    length::estimate,
    model::{Section, TrackAnalysis},
};

fn analysis(tempo: f64, key: Option<u8>, loudness: f64, duration: f64) -> TrackAnalysis {
    TrackAnalysis {
        tempo: Some(tempo),
        key,
        sections: vec![
            Section {
                start: 0.0,
                duration: duration / 2.0,
                loudness,
            },
            Section {
                start: duration / 2.0,
                duration: duration / 2.0,
                loudness,
            },
        ],
        track_duration: duration,
        ..TrackAnalysis::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn estimate_is_a_clamped_phrase_multiple(
        tempo_a in 60.0_f64..200.0,
        tempo_b in 60.0_f64..200.0,
        key_a in proptest::option::of(0_u8..12),
        key_b in proptest::option::of(0_u8..12),
        loud_a in -30.0_f64..0.0,
        loud_b in -30.0_f64..0.0,
        min in proptest::option::of((1_u32..16).prop_map(|phrases| phrases * 4)),
        max in proptest::option::of((4_u32..64).prop_map(|phrases| phrases * 4)),
    ) {
        let a = analysis(tempo_a, key_a, loud_a, 200.0);
        let b = analysis(tempo_b, key_b, loud_b, 180.0);

        let beats = estimate(&a, &b, min, max);

        prop_assert_eq!(beats % 4, 0);

        let lower = min.unwrap_or(8);
        let upper = max.unwrap_or(128).max(lower);
        prop_assert!(beats >= lower.min(upper));
        prop_assert!(beats <= upper);
    }

    #[test]
    fn estimate_never_shrinks_below_one_phrase(
        tempo_a in 60.0_f64..200.0,
        tempo_b in 60.0_f64..200.0,
    ) {
        let a = analysis(tempo_a, None, -0.1, 200.0);
        let b = analysis(tempo_b, None, -0.1, 180.0);
        prop_assert!(estimate(&a, &b, Some(4), None) >= 4);
    }
}

#[test]
fn semitone_delta_stays_on_the_circle() {
    for from in 0_u8..12 {
        for to in 0_u8..12 {
            let delta = nearest_semitone_delta(Some(from), Some(to));
            assert!((-6..=6).contains(&delta), "delta({from},{to}) = {delta}");
        }
        assert_eq!(nearest_semitone_delta(Some(from), Some(from)), 0);
    }
}
