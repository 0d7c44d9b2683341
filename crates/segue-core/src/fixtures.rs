use std::f64::consts::TAU;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    assets::DeckAudio,
    engine::{Deck, Session},
    model::{Bar, Beat, Section, TrackAnalysis},
};

const DEMO_SAMPLE_RATE: u32 = 48_000;

/// Outgoing demo deck: 126 BPM, A minor, a loud outro.
#[must_use]
pub fn demo_analysis_a() -> TrackAnalysis {
    grid_analysis(126.0, Some(9), 224.0, &[(0.0, 16.0, -14.0), (16.0, 192.0, -8.5), (208.0, 16.0, -6.0)])
}

/// Incoming demo deck: 123 BPM, E minor, a quiet intro.
#[must_use]
pub fn demo_analysis_b() -> TrackAnalysis {
    grid_analysis(123.0, Some(4), 198.0, &[(0.0, 12.0, -16.0), (12.0, 170.0, -9.0), (182.0, 16.0, -12.0)])
}

/// A fully loaded fixture session with fixed ids and timestamps, suitable
/// for deterministic demo renders and reports.
#[must_use]
pub fn demo_session() -> Session {
    let mut session = Session::new(demo_analysis_a(), demo_analysis_b());
    session.id = Uuid::parse_str("6b9adf0e-52d5-4c6f-9b43-2f1f5f41f7aa")
        .expect("fixture session id should be valid");
    let fixed_timestamp = DateTime::parse_from_rfc3339("2026-07-14T00:00:00Z")
        .expect("fixture timestamp should be valid")
        .with_timezone(&Utc);
    session.created_at = fixed_timestamp;
    session.updated_at = fixed_timestamp;

    session.deck_a = Deck {
        analysis: demo_analysis_a(),
        audio: Some(synth_deck_audio(220.0, 224.0)),
    };
    session.deck_b = Deck {
        analysis: demo_analysis_b(),
        audio: Some(synth_deck_audio(164.81, 198.0)),
    };
    session
}

/// Deterministic stereo sine deck so renders work without real media.
#[must_use]
pub fn synth_deck_audio(frequency_hz: f64, seconds: f64) -> DeckAudio {
    let frames = (seconds * f64::from(DEMO_SAMPLE_RATE)).round() as usize;
    let step = TAU * frequency_hz / f64::from(DEMO_SAMPLE_RATE);

    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    let mut phase = 0.0_f64;
    for _ in 0..frames {
        let sample = (phase.sin() * 0.25) as f32;
        left.push(sample);
        right.push(sample);
        phase = (phase + step) % TAU;
    }

    DeckAudio {
        sample_rate: DEMO_SAMPLE_RATE,
        channels: vec![left, right],
    }
}

fn grid_analysis(
    tempo: f64,
    key: Option<u8>,
    duration: f64,
    sections: &[(f64, f64, f64)],
) -> TrackAnalysis {
    let beat_seconds = 60.0 / tempo;
    let beat_count = (duration / beat_seconds).floor() as usize;

    let beats: Vec<Beat> = (0..beat_count)
        .map(|i| Beat {
            start: i as f64 * beat_seconds,
            duration: beat_seconds,
            confidence: 0.9,
        })
        .collect();
    let bars: Vec<Bar> = beats
        .iter()
        .step_by(4)
        .map(|beat| Bar {
            start: beat.start,
            duration: beat_seconds * 4.0,
        })
        .collect();

    TrackAnalysis {
        tempo: Some(tempo),
        key,
        mode: Some(0),
        time_signature: 4,
        beats,
        bars,
        sections: sections
            .iter()
            .map(|&(start, length, loudness)| Section {
                start,
                duration: length,
                loudness,
            })
            .collect(),
        track_duration: duration,
    }
}
