//! Determinism fingerprints for a planned transition.
//!
//! Planning and scheduling are pure, so identical analysis input must
//! yield identical automation byte-for-byte. The report hashes the plan,
//! the keyframe sequence, and (when available) a rendered-audio prefix so
//! regressions in reproducibility show up as hash drift.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::{ingest, model::TransitionPlan, render::RenderedMix, schedule::Keyframe};

const REPORT_SCHEMA_VERSION: u32 = 1;
const AUDIO_FINGERPRINT_FRAMES: usize = 96_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionReport {
    pub schema_version: u32,
    pub chosen_beats: u32,
    pub xfade_duration: f64,
    pub keyframe_count: usize,
    pub plan_hash: String,
    pub automation_hash: String,
    pub audio_hash: Option<String>,
}

#[instrument(skip(plan, frames, mix), fields(keyframes = frames.len()))]
pub fn generate_report(
    plan: &TransitionPlan,
    frames: &[Keyframe],
    mix: Option<&RenderedMix>,
) -> Result<TransitionReport> {
    let plan_bytes = serde_json::to_vec(plan).context("failed to serialize plan")?;
    let automation_bytes =
        serde_json::to_vec(frames).context("failed to serialize keyframes")?;

    let audio_hash = mix.map(|mix| {
        let mut bytes =
            Vec::with_capacity(AUDIO_FINGERPRINT_FRAMES * mix.channels.len().max(1) * 2);
        let frame_count = mix
            .channels
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .min(AUDIO_FINGERPRINT_FRAMES);
        for frame in 0..frame_count {
            for channel in &mix.channels {
                let sample = channel.get(frame).copied().unwrap_or(0.0);
                let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
                bytes.extend_from_slice(&quantized.to_le_bytes());
            }
        }
        hash_hex(&bytes)
    });

    Ok(TransitionReport {
        schema_version: REPORT_SCHEMA_VERSION,
        chosen_beats: plan.chosen_beats,
        xfade_duration: plan.xfade_duration,
        keyframe_count: frames.len(),
        plan_hash: hash_hex(&plan_bytes),
        automation_hash: hash_hex(&automation_bytes),
        audio_hash,
    })
}

pub fn read_report(path: &Path) -> Result<TransitionReport> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read transition report: {}", path.display()))?;
    let report: TransitionReport =
        serde_json::from_slice(&bytes).context("failed to parse transition report json")?;
    Ok(report)
}

pub fn write_report(path: &Path, report: &TransitionReport) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(report).context("failed to encode transition report json")?;
    ingest::write_atomic(path, &json)?;
    Ok(())
}

fn hash_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
