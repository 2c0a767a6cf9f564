//! Optimization findings derived from a finished analysis.
//!
//! Findings carry codes and numbers only; wording and localization belong to
//! the caller.

use serde::{Deserialize, Serialize};

use crate::analyzers::{ClippingGlobalAnalysis, SkeletonMetrics};
use crate::config::AnalyzerConfig;
use crate::report::AnimationAnalysis;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    ExcessiveBones { bones: usize, ideal: f32 },
    DeepHierarchy { depth: usize, ideal: f32 },
    ComplexClippingMasks { masks: usize, max_vertices: usize },
    HighVertexAnimation { animation: String, vertices: usize },
    DeformedMeshLoad { animation: String, deformed: usize, weighted: usize },
    ClippingInUse { animation: String, masks: usize },
    NonNormalBlendModes { animation: String, count: usize },
    PhysicsInUse { animation: String, constraints: usize },
    PoorScore { animation: String, score: f32 },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl Finding {
    fn new(severity: Severity, kind: FindingKind) -> Self {
        Self { severity, kind }
    }
}

fn escalate(value: f32, limit: f32) -> Severity {
    if value > limit * 2.0 {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

fn animation_findings(anim: &AnimationAnalysis, cfg: &AnalyzerConfig, out: &mut Vec<Finding>) {
    let high = cfg.thresholds.high_vertex_count;
    if anim.mesh.total_vertices > high {
        out.push(Finding::new(
            escalate(anim.mesh.total_vertices as f32, high as f32),
            FindingKind::HighVertexAnimation {
                animation: anim.name.clone(),
                vertices: anim.mesh.total_vertices,
            },
        ));
    }

    if anim.mesh.deformed_meshes + anim.mesh.weighted_meshes > 0 && anim.mesh.score < 100.0 {
        out.push(Finding::new(
            Severity::Warning,
            FindingKind::DeformedMeshLoad {
                animation: anim.name.clone(),
                deformed: anim.mesh.deformed_meshes,
                weighted: anim.mesh.weighted_meshes,
            },
        ));
    }

    if anim.clipping.active_masks > 0 {
        let severity = if anim.clipping.score < 50.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        out.push(Finding::new(
            severity,
            FindingKind::ClippingInUse {
                animation: anim.name.clone(),
                masks: anim.clipping.active_masks,
            },
        ));
    }

    if anim.blend_mode.non_normal_count > 0 {
        let severity = if anim.blend_mode.score < 100.0 {
            Severity::Warning
        } else {
            Severity::Info
        };
        out.push(Finding::new(
            severity,
            FindingKind::NonNormalBlendModes {
                animation: anim.name.clone(),
                count: anim.blend_mode.non_normal_count,
            },
        ));
    }

    if anim.constraint.active_physics > 0 {
        out.push(Finding::new(
            Severity::Info,
            FindingKind::PhysicsInUse {
                animation: anim.name.clone(),
                constraints: anim.constraint.active_physics,
            },
        ));
    }

    if anim.overall_score < cfg.thresholds.poor_score {
        out.push(Finding::new(
            Severity::Critical,
            FindingKind::PoorScore {
                animation: anim.name.clone(),
                score: anim.overall_score,
            },
        ));
    }
}

/// Asset-wide findings first, then per-animation findings in animation order.
pub fn collect(
    skeleton: &SkeletonMetrics,
    clipping: &ClippingGlobalAnalysis,
    animations: &[AnimationAnalysis],
    cfg: &AnalyzerConfig,
) -> Vec<Finding> {
    let mut out = Vec::new();
    let scoring = &cfg.scoring;

    if skeleton.total_bones as f32 > scoring.ideal_bone_count {
        out.push(Finding::new(
            escalate(skeleton.total_bones as f32, scoring.ideal_bone_count),
            FindingKind::ExcessiveBones {
                bones: skeleton.total_bones,
                ideal: scoring.ideal_bone_count,
            },
        ));
    }
    if skeleton.max_depth as f32 > scoring.ideal_max_depth {
        out.push(Finding::new(
            Severity::Warning,
            FindingKind::DeepHierarchy {
                depth: skeleton.max_depth,
                ideal: scoring.ideal_max_depth,
            },
        ));
    }
    if clipping.complex_masks > 0 {
        let max_vertices = clipping
            .masks
            .iter()
            .map(|m| m.vertex_count)
            .max()
            .unwrap_or(0);
        out.push(Finding::new(
            Severity::Warning,
            FindingKind::ComplexClippingMasks {
                masks: clipping.complex_masks,
                max_vertices,
            },
        ));
    }

    for anim in animations {
        animation_findings(anim, cfg, &mut out);
    }
    out
}
