use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    assets::DeckAudio,
    model::{TrackAnalysis, TransitionPlan},
    planner::{self, PlanOptions, TempoStrategy},
    render::{RenderDevice, RenderError, RenderJob, RenderedMix},
    report::{self, TransitionReport},
    schedule::{
        self, Keyframe, LIVE_SCHEDULING_LATENCY_SECONDS, OFFLINE_RENDER_EPOCH_SECONDS,
        RenderOptions,
    },
    wav,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no transition has been planned")]
    PlanNotReady,
    #[error("deck {0} has no decoded audio")]
    MissingAudio(DeckSide),
    #[error("rendering device has no output context")]
    OutputContextMissing,
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("io error: {0}")]
    Io(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckSide {
    A,
    B,
}

impl std::fmt::Display for DeckSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckSide::A => f.write_str("A"),
            DeckSide::B => f.write_str("B"),
        }
    }
}

/// One deck: its analysis and, once a host supplies it, decoded audio.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub analysis: TrackAnalysis,
    pub audio: Option<DeckAudio>,
}

/// Explicit session state: the two decks and the latest plan. Passed into
/// planner and scheduler calls; there is no ambient global.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub deck_a: Deck,
    pub deck_b: Deck,
    pub plan: Option<TransitionPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(analysis_a: TrackAnalysis, analysis_b: TrackAnalysis) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            deck_a: Deck {
                analysis: analysis_a,
                audio: None,
            },
            deck_b: Deck {
                analysis: analysis_b,
                audio: None,
            },
            plan: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Everything one planning call needs besides the session itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanRequest {
    pub beats_length: u32,
    pub strategy: TempoStrategy,
    pub options: PlanOptions,
}

#[derive(Debug, Clone)]
pub struct Engine {
    session: Session,
}

impl Engine {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[instrument(skip(self, analysis), fields(session_id = %self.session.id, side = %side))]
    pub fn load_analysis(&mut self, side: DeckSide, analysis: TrackAnalysis) {
        let deck = self.deck_mut(side);
        deck.analysis = analysis;
        self.session.plan = None;
        self.session.touch();
        info!("deck analysis loaded");
    }

    #[instrument(skip(self, audio), fields(session_id = %self.session.id, side = %side))]
    pub fn load_audio(&mut self, side: DeckSide, audio: DeckAudio) {
        let frames = audio.frame_count();
        self.deck_mut(side).audio = Some(audio);
        self.session.touch();
        info!(frames, "deck audio loaded");
    }

    /// Plan (or re-plan) the transition. The plan is recomputed from
    /// scratch on every call and replaces the previous one.
    #[instrument(skip(self, request), fields(session_id = %self.session.id, beats = request.beats_length, strategy = ?request.strategy))]
    pub fn plan_transition(&mut self, request: &PlanRequest) -> TransitionPlan {
        let plan = planner::plan(
            &self.session.deck_a.analysis,
            &self.session.deck_b.analysis,
            request.beats_length,
            request.strategy,
            &request.options,
        );
        self.session.plan = Some(plan);
        self.session.touch();
        info!(
            xfade_duration = plan.xfade_duration,
            chosen_beats = plan.chosen_beats,
            "transition planned"
        );
        plan
    }

    /// Keyframes for the real-time preview path, offset by the scheduling
    /// latency so the device can anchor them to its own clock.
    pub fn preview_keyframes(
        &self,
        options: &RenderOptions,
        step_count: u32,
    ) -> Result<Vec<Keyframe>, EngineError> {
        let plan = self.session.plan.as_ref().ok_or(EngineError::PlanNotReady)?;
        let frames = schedule::schedule(
            plan,
            &self.session.deck_a.analysis,
            &self.session.deck_b.analysis,
            options,
            step_count,
        );
        Ok(schedule::with_time_origin(
            &frames,
            LIVE_SCHEDULING_LATENCY_SECONDS,
        ))
    }

    /// Submit the plan and its keyframes to the rendering device and wait
    /// for the completed buffer. Device failures surface as-is; the
    /// engine never retries a render.
    #[instrument(skip(self, device, options), fields(session_id = %self.session.id, step_count))]
    pub fn render_offline(
        &self,
        device: &mut dyn RenderDevice,
        options: &RenderOptions,
        step_count: u32,
    ) -> Result<RenderedMix, EngineError> {
        let plan = self.session.plan.as_ref().ok_or(EngineError::PlanNotReady)?;
        let deck_a = self
            .session
            .deck_a
            .audio
            .as_ref()
            .ok_or(EngineError::MissingAudio(DeckSide::A))?;
        let deck_b = self
            .session
            .deck_b
            .audio
            .as_ref()
            .ok_or(EngineError::MissingAudio(DeckSide::B))?;
        if device.output_spec().is_none() {
            return Err(EngineError::OutputContextMissing);
        }

        let frames = schedule::schedule(
            plan,
            &self.session.deck_a.analysis,
            &self.session.deck_b.analysis,
            options,
            step_count,
        );
        let frames = schedule::with_time_origin(&frames, OFFLINE_RENDER_EPOCH_SECONDS);

        let mix = device.render(&RenderJob {
            plan,
            frames: &frames,
            deck_a,
            deck_b,
            total_seconds: schedule::offline_render_seconds(plan),
        })?;
        info!(
            frames = mix.channels.first().map_or(0, Vec::len),
            "offline render received"
        );
        Ok(mix)
    }

    /// Offline render plus WAV export, returning the determinism report
    /// for the exported transition.
    #[instrument(skip(self, device, options), fields(session_id = %self.session.id, path = %path.display()))]
    pub fn export_wav(
        &self,
        device: &mut dyn RenderDevice,
        options: &RenderOptions,
        step_count: u32,
        path: &Path,
    ) -> Result<TransitionReport, EngineError> {
        let mix = self.render_offline(device, options, step_count)?;
        wav::write_wav(path, &mix.channels, mix.sample_rate)?;

        let plan = self.session.plan.as_ref().ok_or(EngineError::PlanNotReady)?;
        let frames = schedule::schedule(
            plan,
            &self.session.deck_a.analysis,
            &self.session.deck_b.analysis,
            options,
            step_count,
        );
        let report = report::generate_report(plan, &frames, Some(&mix))?;
        info!("wav export completed");
        Ok(report)
    }

    fn deck_mut(&mut self, side: DeckSide) -> &mut Deck {
        match side {
            DeckSide::A => &mut self.session.deck_a,
            DeckSide::B => &mut self.session.deck_b,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            session: Session::new(TrackAnalysis::default(), TrackAnalysis::default()),
        }
    }
}
