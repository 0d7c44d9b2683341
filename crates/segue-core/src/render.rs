//! Rendering-device boundary.
//!
//! The planner's obligation ends at a consistent, monotonically ordered
//! keyframe sequence; a device's obligation is linear interpolation
//! between keyframes. [`OfflineRenderer`] is the reference device used by
//! the export path: it applies gain and playback-rate automation (rates
//! arrive pre-clamped from the scheduler) with linear resampling. Filter
//! and EQ tracks are carried in the keyframes for devices that support
//! them; the reference device does not.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    assets::DeckAudio, model::TransitionPlan, schedule::Keyframe, time::seconds_to_frames,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering device has no output context")]
    OutputContextMissing,
    #[error("render job carries no keyframes")]
    EmptySchedule,
    #[error("render job length is not positive")]
    EmptyWindow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSpec {
    pub sample_rate: u32,
    pub channel_count: u16,
}

/// One render submission: a plan, its origin-shifted keyframes, and the
/// two source decks. A single render is outstanding at a time.
#[derive(Debug)]
pub struct RenderJob<'a> {
    pub plan: &'a TransitionPlan,
    pub frames: &'a [Keyframe],
    pub deck_a: &'a DeckAudio,
    pub deck_b: &'a DeckAudio,
    pub total_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMix {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

pub trait RenderDevice {
    /// The established output context, if any. Rendering without one is a
    /// configuration error, not a recoverable condition.
    fn output_spec(&self) -> Option<OutputSpec>;

    fn render(&mut self, job: &RenderJob<'_>) -> Result<RenderedMix, RenderError>;
}

/// Reference offline device: fixed-length multichannel render with linear
/// keyframe interpolation and per-sample variable-rate playback.
#[derive(Debug, Clone, Default)]
pub struct OfflineRenderer {
    output: Option<OutputSpec>,
}

impl OfflineRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output(sample_rate: u32, channel_count: u16) -> Self {
        Self {
            output: Some(OutputSpec {
                sample_rate,
                channel_count,
            }),
        }
    }

    pub fn set_output(&mut self, sample_rate: u32, channel_count: u16) {
        self.output = Some(OutputSpec {
            sample_rate,
            channel_count,
        });
    }
}

impl RenderDevice for OfflineRenderer {
    fn output_spec(&self) -> Option<OutputSpec> {
        self.output
    }

    #[instrument(skip(self, job), fields(total_seconds = job.total_seconds))]
    fn render(&mut self, job: &RenderJob<'_>) -> Result<RenderedMix, RenderError> {
        let spec = self.output.ok_or(RenderError::OutputContextMissing)?;
        if job.frames.is_empty() {
            return Err(RenderError::EmptySchedule);
        }
        if job.total_seconds <= 0.0 {
            return Err(RenderError::EmptyWindow);
        }

        let out_rate = f64::from(spec.sample_rate.max(1));
        let total_frames = seconds_to_frames(job.total_seconds, spec.sample_rate.max(1)) as usize;
        let channel_count = usize::from(spec.channel_count.max(1));

        let mut channels = vec![vec![0.0_f32; total_frames]; channel_count];
        let mut automation = AutomationCursor::new(job.frames);
        let mut playhead_a = job.plan.start_a;
        let mut playhead_b = job.plan.start_b;

        for frame in 0..total_frames {
            let t = frame as f64 / out_rate;
            let state = automation.at(t);

            for (channel_index, channel) in channels.iter_mut().enumerate() {
                let a = sample_linear(job.deck_a, channel_index, playhead_a);
                let b = sample_linear(job.deck_b, channel_index, playhead_b);
                channel[frame] = (a * state.gain_a + b * state.gain_b).clamp(-1.0, 1.0);
            }

            playhead_a += state.rate_a / out_rate;
            playhead_b += state.rate_b / out_rate;
        }

        debug!(
            frames = total_frames,
            channels = channel_count,
            "offline render completed"
        );
        Ok(RenderedMix {
            sample_rate: spec.sample_rate,
            channels,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct AutomationState {
    gain_a: f32,
    gain_b: f32,
    rate_a: f64,
    rate_b: f64,
}

impl From<&Keyframe> for AutomationState {
    fn from(frame: &Keyframe) -> Self {
        Self {
            gain_a: frame.gain_a,
            gain_b: frame.gain_b,
            rate_a: frame.rate_a,
            rate_b: frame.rate_b,
        }
    }
}

/// Monotonic cursor over a time-ordered keyframe sequence. Values before
/// the first keyframe hold its state; values after the last hold the
/// last; interior times interpolate linearly.
struct AutomationCursor<'a> {
    frames: &'a [Keyframe],
    index: usize,
}

impl<'a> AutomationCursor<'a> {
    fn new(frames: &'a [Keyframe]) -> Self {
        Self { frames, index: 0 }
    }

    fn at(&mut self, t: f64) -> AutomationState {
        while self.index + 1 < self.frames.len()
            && self.frames[self.index + 1].offset_seconds <= t
        {
            self.index += 1;
        }

        let current = &self.frames[self.index];
        if t <= current.offset_seconds || self.index + 1 >= self.frames.len() {
            return current.into();
        }

        let next = &self.frames[self.index + 1];
        let span = next.offset_seconds - current.offset_seconds;
        if span <= 0.0 {
            return next.into();
        }
        let blend = ((t - current.offset_seconds) / span).clamp(0.0, 1.0);

        AutomationState {
            gain_a: lerp_f32(current.gain_a, next.gain_a, blend),
            gain_b: lerp_f32(current.gain_b, next.gain_b, blend),
            rate_a: current.rate_a + (next.rate_a - current.rate_a) * blend,
            rate_b: current.rate_b + (next.rate_b - current.rate_b) * blend,
        }
    }
}

fn lerp_f32(from: f32, to: f32, blend: f64) -> f32 {
    from + (to - from) * blend as f32
}

/// Linear-interpolated read at a fractional source position in seconds.
fn sample_linear(deck: &DeckAudio, channel: usize, position_seconds: f64) -> f32 {
    if position_seconds < 0.0 || deck.sample_rate == 0 {
        return 0.0;
    }

    let position = position_seconds * f64::from(deck.sample_rate);
    let frame = position.floor() as usize;
    let fraction = (position - position.floor()) as f32;

    let current = deck.sample(channel, frame);
    let next = deck.sample(channel, frame + 1);
    current + (next - current) * fraction
}
