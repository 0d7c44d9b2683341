//! Crossfade curves and easing functions.
//!
//! Each curve maps normalized transition progress to a gain pair for the
//! outgoing deck (A) and the incoming deck (B). Progress is clamped to
//! [0.0, 1.0] before evaluation; callers clamp the resulting gains.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Crossfade curve selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum XfadeCurve {
    /// `gA = cos(p·π/2)`, `gB = sin(p·π/2)` — constant perceived loudness.
    #[default]
    EqualPower,
    /// `gA = 1 − p`, `gB = p`.
    Linear,
    /// `gB = smoothstep(p)`, `gA = 1 − p^0.8` — the incoming deck rises
    /// faster than the outgoing deck falls.
    Rise,
    /// Progress remapped through `0.5 − 0.5·cos(π·p)` before the
    /// equal-power pair — stretches both ends, compresses the overlap.
    DjS,
}

impl XfadeCurve {
    /// Gain pair `(gain_a, gain_b)` at fade progress `p` ∈ [0.0, 1.0].
    #[must_use]
    pub fn gains(self, progress: f32) -> (f32, f32) {
        let p = progress.clamp(0.0, 1.0);

        match self {
            XfadeCurve::EqualPower => equal_power(p),
            XfadeCurve::Linear => (1.0 - p, p),
            XfadeCurve::Rise => {
                let rise = p * p * (3.0 - 2.0 * p);
                (1.0 - p.powf(0.8), rise)
            }
            XfadeCurve::DjS => {
                let s = 0.5 - 0.5 * (PI * p).cos();
                equal_power(s)
            }
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "equal_power" | "equal-power" | "equalpower" => Some(XfadeCurve::EqualPower),
            "linear" => Some(XfadeCurve::Linear),
            "rise" => Some(XfadeCurve::Rise),
            "dj_s" | "dj-s" | "djs" => Some(XfadeCurve::DjS),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            XfadeCurve::EqualPower => "equal_power",
            XfadeCurve::Linear => "linear",
            XfadeCurve::Rise => "rise",
            XfadeCurve::DjS => "dj_s",
        }
    }
}

fn equal_power(p: f32) -> (f32, f32) {
    ((p * FRAC_PI_2).cos(), (p * FRAC_PI_2).sin())
}

/// Cubic ease-in, `t³`. Used for incoming-deck secondary automation.
#[must_use]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out, `1 − (1 − t)³`. Used for outgoing-deck secondary automation.
#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
