//! Non-normal blend mode usage. Each non-normal slot breaks draw batching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::active::ActiveComponentSet;
use crate::config::ScoringConfig;
use crate::model::{BlendMode, SkeletonView, Slot};
use crate::scoring::{saturation, score_from};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlendModeMetrics {
    pub non_normal_count: usize,
    pub additive_count: usize,
    pub multiply_count: usize,
    pub screen_count: usize,
    pub score: f32,
}

impl Default for BlendModeMetrics {
    fn default() -> Self {
        Self {
            non_normal_count: 0,
            additive_count: 0,
            multiply_count: 0,
            screen_count: 0,
            score: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlendModeGlobalAnalysis {
    /// Slot count per blend mode, normal included.
    pub histogram: BTreeMap<BlendMode, usize>,
    /// Slots using a non-normal blend mode, in slot order.
    pub non_normal_slots: Vec<String>,
    pub metrics: BlendModeMetrics,
}

pub fn score_blend_modes(non_normal: usize, cfg: &ScoringConfig) -> f32 {
    score_from(&[saturation(cfg.ideal_blend_mode_count, non_normal as f32)])
}

fn count<'a>(slots: impl Iterator<Item = &'a Slot>, cfg: &ScoringConfig) -> BlendModeMetrics {
    let mut metrics = BlendModeMetrics::default();
    for slot in slots {
        match slot.blend {
            BlendMode::Normal => continue,
            BlendMode::Additive => metrics.additive_count += 1,
            BlendMode::Multiply => metrics.multiply_count += 1,
            BlendMode::Screen => metrics.screen_count += 1,
        }
        metrics.non_normal_count += 1;
    }
    metrics.score = score_blend_modes(metrics.non_normal_count, cfg);
    metrics
}

pub fn analyze_for_animation<S: SkeletonView + ?Sized>(
    pose: &S,
    active: &ActiveComponentSet,
    cfg: &ScoringConfig,
) -> BlendModeMetrics {
    count(
        pose.slots().iter().filter(|s| active.slots.contains(&s.name)),
        cfg,
    )
}

pub fn analyze_global<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> BlendModeGlobalAnalysis {
    let mut histogram = BTreeMap::new();
    for slot in pose.slots() {
        *histogram.entry(slot.blend).or_insert(0usize) += 1;
    }
    let non_normal_slots = pose
        .slots()
        .iter()
        .filter(|s| !s.blend.is_normal())
        .map(|s| s.name.clone())
        .collect();

    BlendModeGlobalAnalysis {
        histogram,
        non_normal_slots,
        metrics: count(pose.slots().iter(), cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_ideal_scores_full() {
        let cfg = ScoringConfig::default();
        assert_eq!(score_blend_modes(0, &cfg), 100.0);
        assert_eq!(score_blend_modes(2, &cfg), 100.0);
        assert_eq!(score_blend_modes(4, &cfg), 50.0);
    }
}
