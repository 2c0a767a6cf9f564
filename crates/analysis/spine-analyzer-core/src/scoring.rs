//! Shared scoring and number utilities.
//!
//! Every category score is built from [`saturation`]: 1 while the measured
//! load stays at or below its ideal, then `ideal / load`, so scores only fall
//! once the ideal is exceeded and keep falling strictly as load grows.

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f32 = 100.0;

/// `clamp(ideal / max(actual, ideal), 0, 1)`.
#[inline]
pub fn saturation(ideal: f32, actual: f32) -> f32 {
    if !(ideal > 0.0) || !actual.is_finite() {
        return if actual.is_finite() { 1.0 } else { 0.0 };
    }
    (ideal / actual.max(ideal)).clamp(0.0, 1.0)
}

/// Count with `flagged` items weighted by `factor` instead of 1.
#[inline]
pub fn penalized(count: usize, flagged: usize, factor: f32) -> f32 {
    count as f32 + flagged as f32 * (factor - 1.0).max(0.0)
}

/// Product of saturation ratios, scaled to [0, 100].
pub fn score_from(ratios: &[f32]) -> f32 {
    clamp_score(ratios.iter().product::<f32>() * MAX_SCORE)
}

#[inline]
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// `part / whole` as a percentage; 0 when `whole` is 0.
#[inline]
pub fn percent(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32 * 100.0
    }
}

/// Qualitative band for a 0..=100 score.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn from_score(score: f32) -> Self {
        if score >= 85.0 {
            ScoreBand::Excellent
        } else if score >= 70.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}
