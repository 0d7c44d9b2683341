#[must_use]
pub fn seconds_per_beat(bpm: f64) -> f64 {
    if bpm <= 0.0 {
        return 0.0;
    }

    60.0 / bpm
}

#[must_use]
pub fn beats_to_seconds(beats: f64, bpm: f64) -> f64 {
    if beats <= 0.0 || bpm <= 0.0 {
        return 0.0;
    }

    beats * seconds_per_beat(bpm)
}

/// Length of a four-beat phrase span at the given tempo.
#[must_use]
pub fn phrase_seconds(bpm: f64) -> f64 {
    beats_to_seconds(4.0, bpm)
}

#[must_use]
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    if seconds <= 0.0 || sample_rate == 0 {
        return 0;
    }

    (seconds * f64::from(sample_rate)).round() as u64
}

#[must_use]
pub fn frames_to_seconds(frames: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }

    frames as f64 / f64::from(sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_span_at_reference_tempos() {
        assert!((seconds_per_beat(120.0) - 0.5).abs() < 1e-12);
        assert!((seconds_per_beat(60.0) - 1.0).abs() < 1e-12);
        assert!((beats_to_seconds(16.0, 120.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn phrase_span_is_four_beats() {
        assert!((phrase_seconds(128.0) - 4.0 * seconds_per_beat(128.0)).abs() < 1e-12);
    }

    #[test]
    fn frame_round_trip_is_stable() {
        let sample_rate = 48_000;
        let frames = seconds_to_frames(12.34, sample_rate);
        let restored = frames_to_seconds(frames, sample_rate);
        assert!((restored - 12.34).abs() < 1.0 / f64::from(sample_rate));
    }

    #[test]
    fn degenerate_inputs_collapse_to_zero() {
        assert_eq!(seconds_per_beat(0.0), 0.0);
        assert_eq!(beats_to_seconds(4.0, -1.0), 0.0);
        assert_eq!(seconds_to_frames(1.0, 0), 0);
    }
}
