//! Score aggregation: weighted overall score, asset median and ranking.

use crate::config::CategoryWeights;
use crate::scoring::{clamp_score, MAX_SCORE};

/// The five category scores of one animation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CategoryScores {
    pub skeleton: f32,
    pub mesh: f32,
    pub clipping: f32,
    pub blend_mode: f32,
    pub constraint: f32,
}

/// Weighted sum of the category scores, clamped to [0, 100].
pub fn overall_score(scores: &CategoryScores, weights: &CategoryWeights) -> f32 {
    clamp_score(
        scores.skeleton * weights.skeleton
            + scores.mesh * weights.mesh
            + scores.clipping * weights.clipping
            + scores.blend_mode * weights.blend_mode
            + scores.constraint * weights.constraint,
    )
}

/// Element at index `n / 2` of the ascending scores. For even `n` this is the
/// upper of the two middle elements, not their mean. Empty input yields 100.
pub fn median_score(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return MAX_SCORE;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f32::total_cmp);
    sorted[sorted.len() / 2]
}

/// Indices ordered by descending score. Ties keep their original order.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// `(best, worst)` indices, or `None` when there are no scores.
pub fn best_and_worst(scores: &[f32]) -> Option<(usize, usize)> {
    let ranked = rank_descending(scores);
    Some((*ranked.first()?, *ranked.last()?))
}
