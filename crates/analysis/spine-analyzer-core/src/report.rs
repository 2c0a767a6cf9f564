//! Report types handed back to callers. Plain values; nothing borrows the pose.

use serde::{Deserialize, Serialize};

use crate::active::ActiveComponentSet;
use crate::aggregate::CategoryScores;
use crate::analyzers::{
    BlendModeGlobalAnalysis, BlendModeMetrics, ClippingGlobalAnalysis, ClippingMetrics,
    ConstraintGlobalAnalysis, ConstraintMetrics, MeshGlobalAnalysis, MeshMetrics,
    SkeletonMetrics,
};
use crate::findings::Finding;
use crate::scoring::ScoreBand;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationAnalysis {
    pub name: String,
    /// Seconds.
    pub duration: f32,
    pub sample_count: usize,
    pub overall_score: f32,
    pub band: ScoreBand,
    pub skeleton_score: f32,
    pub mesh: MeshMetrics,
    pub clipping: ClippingMetrics,
    pub blend_mode: BlendModeMetrics,
    pub constraint: ConstraintMetrics,
    pub active_bones: usize,
    pub active_components: ActiveComponentSet,
}

impl AnimationAnalysis {
    pub fn category_scores(&self) -> CategoryScores {
        CategoryScores {
            skeleton: self.skeleton_score,
            mesh: self.mesh.score,
            clipping: self.clipping.score,
            blend_mode: self.blend_mode.score,
            constraint: self.constraint.score,
        }
    }
}

/// Counts of animations exhibiting each feature.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisStats {
    pub animations_with_physics: usize,
    pub animations_with_clipping: usize,
    pub animations_with_blend_modes: usize,
    pub animations_with_ik: usize,
    pub animations_with_transform: usize,
    pub animations_with_path: usize,
    pub high_vertex_animations: usize,
    pub poor_score_animations: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub asset_name: String,
    pub total_animations: usize,
    pub total_skins: usize,
    pub skeleton: SkeletonMetrics,
    /// In the pose model's animation order.
    pub animations: Vec<AnimationAnalysis>,
    pub mesh_analysis: MeshGlobalAnalysis,
    pub clipping_analysis: ClippingGlobalAnalysis,
    pub blend_mode_analysis: BlendModeGlobalAnalysis,
    /// Inventory of all four constraint families.
    pub physics_analysis: ConstraintGlobalAnalysis,
    pub median_score: f32,
    pub overall_band: ScoreBand,
    /// Index into `animations`.
    pub best_animation: Option<usize>,
    /// Index into `animations`.
    pub worst_animation: Option<usize>,
    pub stats: AnalysisStats,
    pub findings: Vec<Finding>,
}

impl AnalysisResult {
    pub fn best(&self) -> Option<&AnimationAnalysis> {
        self.best_animation.and_then(|i| self.animations.get(i))
    }

    pub fn worst(&self) -> Option<&AnimationAnalysis> {
        self.worst_animation.and_then(|i| self.animations.get(i))
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationAnalysis> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// Export as `serde_json::Value` (stable schema for FFI/serialization).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
