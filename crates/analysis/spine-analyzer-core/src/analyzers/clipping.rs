//! Clipping mask cost.
//!
//! Masks are bound per slot, so per-animation usage is the global mask
//! inventory restricted to the animation's active slots.

use serde::{Deserialize, Serialize};

use crate::active::ActiveComponentSet;
use crate::config::ScoringConfig;
use crate::model::SkeletonView;
use crate::scoring::{penalized, saturation, score_from};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClippingMetrics {
    pub active_masks: usize,
    pub total_vertices: usize,
    pub complex_masks: usize,
    pub score: f32,
}

impl Default for ClippingMetrics {
    fn default() -> Self {
        Self {
            active_masks: 0,
            total_vertices: 0,
            complex_masks: 0,
            score: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClippingMaskInfo {
    pub slot: String,
    pub attachment: String,
    pub vertex_count: usize,
    /// Vertex count above the configured threshold.
    pub is_complex: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClippingGlobalAnalysis {
    pub masks: Vec<ClippingMaskInfo>,
    pub total_masks: usize,
    pub total_vertices: usize,
    pub complex_masks: usize,
    pub score: f32,
}

pub fn score_clipping(masks: usize, complex: usize, cfg: &ScoringConfig) -> f32 {
    score_from(&[saturation(
        cfg.ideal_clipping_count,
        penalized(masks, complex, cfg.complex_clipping_factor),
    )])
}

/// Every clipping attachment across all skins.
pub fn mask_inventory<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> Vec<ClippingMaskInfo> {
    let mut masks = Vec::new();
    for skin in pose.skins() {
        for entry in &skin.attachments {
            let Some(clip) = entry.attachment.as_clipping() else {
                continue;
            };
            let Some(slot) = pose.slots().get(entry.slot) else {
                log::debug!(
                    "clipping '{}' references unknown slot {}",
                    entry.attachment.name,
                    entry.slot
                );
                continue;
            };
            let vertex_count = clip.vertex_count();
            masks.push(ClippingMaskInfo {
                slot: slot.name.clone(),
                attachment: entry.attachment.name.clone(),
                vertex_count,
                is_complex: vertex_count > cfg.clipping_vertex_threshold,
            });
        }
    }
    masks
}

fn summarize<'a>(masks: impl Iterator<Item = &'a ClippingMaskInfo>, cfg: &ScoringConfig) -> ClippingMetrics {
    let mut metrics = ClippingMetrics::default();
    for mask in masks {
        metrics.active_masks += 1;
        metrics.total_vertices += mask.vertex_count;
        if mask.is_complex {
            metrics.complex_masks += 1;
        }
    }
    metrics.score = score_clipping(metrics.active_masks, metrics.complex_masks, cfg);
    metrics
}

pub fn analyze_for_animation(
    inventory: &[ClippingMaskInfo],
    active: &ActiveComponentSet,
    cfg: &ScoringConfig,
) -> ClippingMetrics {
    summarize(
        inventory.iter().filter(|m| active.slots.contains(&m.slot)),
        cfg,
    )
}

pub fn analyze_global<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> ClippingGlobalAnalysis {
    let masks = mask_inventory(pose, cfg);
    let summary = summarize(masks.iter(), cfg);
    ClippingGlobalAnalysis {
        total_masks: summary.active_masks,
        total_vertices: summary.total_vertices,
        complex_masks: summary.complex_masks,
        score: summary.score,
        masks,
    }
}
