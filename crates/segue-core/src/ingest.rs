//! Analysis ingestion and plan persistence.
//!
//! Reading an analysis *file* can fail (I/O, not JSON at all), but turning
//! any parsed JSON value into a [`TrackAnalysis`] cannot: absent or
//! malformed fields degrade to the documented defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::model::{
    Bar, Beat, DEFAULT_SECTION_LOUDNESS_DB, DEFAULT_TIME_SIGNATURE,
    FALLBACK_TRACK_DURATION_SECONDS, Section, TrackAnalysis,
};

#[instrument(fields(path = %path.display()))]
pub fn load_analysis(path: &Path) -> Result<TrackAnalysis> {
    let content =
        fs::read(path).with_context(|| format!("failed to read analysis: {}", path.display()))?;
    let value: Value = serde_json::from_slice(&content).context("analysis is not valid json")?;
    let analysis = analysis_from_value(&value);
    info!(
        beats = analysis.beats.len(),
        bars = analysis.bars.len(),
        sections = analysis.sections.len(),
        "analysis loaded"
    );
    Ok(analysis)
}

/// Normalize a parsed JSON value into a [`TrackAnalysis`]. Total: any
/// shape (including non-objects) produces a usable analysis.
#[must_use]
pub fn analysis_from_value(value: &Value) -> TrackAnalysis {
    let tempo = field_f64(value, &["tempo", "bpm"]).filter(|t| *t > 0.0);
    let key = field_f64(value, &["key"])
        .filter(|k| (0.0..12.0).contains(k))
        .map(|k| k as u8);
    let mode = field_f64(value, &["mode"])
        .filter(|m| (0.0..=255.0).contains(m))
        .map(|m| m as u8);
    let time_signature = field_f64(value, &["timeSignature", "time_signature"])
        .filter(|ts| *ts >= 1.0)
        .map_or(DEFAULT_TIME_SIGNATURE, |ts| ts as u32);

    let mut beats: Vec<Beat> = events(value, &["beats"])
        .iter()
        .filter_map(|event| {
            Some(Beat {
                start: event_start(event)?,
                duration: field_f64(event, &["duration"]).unwrap_or(0.0),
                confidence: field_f64(event, &["confidence"]).unwrap_or(1.0),
            })
        })
        .collect();
    beats.sort_by(|left, right| left.start.total_cmp(&right.start));

    let mut bars: Vec<Bar> = events(value, &["bars"])
        .iter()
        .filter_map(|event| {
            Some(Bar {
                start: event_start(event)?,
                duration: field_f64(event, &["duration"]).unwrap_or(0.0),
            })
        })
        .collect();
    bars.sort_by(|left, right| left.start.total_cmp(&right.start));

    let mut sections: Vec<Section> = events(value, &["sections"])
        .iter()
        .filter_map(|event| {
            Some(Section {
                start: event_start(event)?,
                duration: field_f64(event, &["duration"]).unwrap_or(0.0),
                loudness: field_f64(event, &["loudness"]).unwrap_or(DEFAULT_SECTION_LOUDNESS_DB),
            })
        })
        .collect();
    sections.sort_by(|left, right| left.start.total_cmp(&right.start));

    let track_duration = field_f64(value, &["trackDuration", "track_duration", "duration"])
        .filter(|d| *d > 0.0)
        .or_else(|| beats.last().map(|beat| beat.start))
        .filter(|d| *d > 0.0)
        .unwrap_or(FALLBACK_TRACK_DURATION_SECONDS);

    TrackAnalysis {
        tempo,
        key,
        mode,
        time_signature,
        beats,
        bars,
        sections,
        track_duration,
    }
}

#[instrument(skip(plan), fields(path = %path.display()))]
pub fn save_plan(path: &Path, plan: &crate::model::TransitionPlan) -> Result<()> {
    let json = serde_json::to_vec_pretty(plan).context("failed to serialize plan")?;
    write_atomic(path, &json)?;
    info!("plan saved");
    Ok(())
}

#[instrument(fields(path = %path.display()))]
pub fn load_plan(path: &Path) -> Result<crate::model::TransitionPlan> {
    let content =
        fs::read(path).with_context(|| format!("failed to read plan: {}", path.display()))?;
    let plan = serde_json::from_slice(&content).context("invalid plan json")?;
    debug!("plan loaded");
    Ok(plan)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let mut temp_file = tempfile::NamedTempFile::new_in(
        path.parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    )
    .context("failed to create temp file")?;

    use std::io::Write;
    temp_file
        .write_all(bytes)
        .context("failed to write temp file")?;
    temp_file
        .persist(path)
        .map_err(|error| anyhow::anyhow!(error.error))
        .with_context(|| format!("failed to persist file: {}", path.display()))?;
    Ok(())
}

fn field_f64(value: &Value, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .find_map(|name| value.get(*name))
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn events<'a>(value: &'a Value, names: &[&str]) -> &'a [Value] {
    names
        .iter()
        .find_map(|name| value.get(*name))
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn event_start(event: &Value) -> Option<f64> {
    field_f64(event, &["start"])
}
