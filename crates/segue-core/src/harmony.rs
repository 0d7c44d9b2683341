//! Key-distance and semitone-ratio math on the 12-tone circle.

/// Signed shortest rotation from `from_key` to `to_key` on the pitch-class
/// circle, in semitones. Keys are pitch-class indices (0 = C .. 11 = B).
///
/// Returns 0 when either key is absent.
#[must_use]
pub fn nearest_semitone_delta(from_key: Option<u8>, to_key: Option<u8>) -> i32 {
    let (Some(from), Some(to)) = (from_key, to_key) else {
        return 0;
    };

    let mut delta = ((i32::from(from) - i32::from(to)) % 12 + 12) % 12;
    if delta > 6 {
        delta -= 12;
    }
    delta
}

/// Playback-rate ratio for a pitch shift of `semitones` (`2^(s/12)`).
///
/// Non-finite input maps to the identity ratio.
#[must_use]
pub fn ratio_from_semitones(semitones: f64) -> f64 {
    if !semitones.is_finite() {
        return 1.0;
    }

    (semitones / 12.0).exp2()
}
