//! Bone hierarchy analysis (animation independent).

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::model::{Bone, SkeletonView};
use crate::scoring::{saturation, score_from};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SkeletonMetrics {
    pub total_bones: usize,
    pub root_bones: usize,
    pub leaf_bones: usize,
    /// Longest root-to-leaf chain; a root has depth 0.
    pub max_depth: usize,
    pub average_depth: f32,
    pub score: f32,
}

/// Depth of every bone, following parent links. Bones on a parent cycle or
/// with a dangling parent index are treated as roots of their own chain.
pub fn bone_depths(bones: &[Bone]) -> Vec<usize> {
    let mut depths = Vec::with_capacity(bones.len());
    for bone in bones {
        let mut depth = 0usize;
        let mut parent = bone.parent;
        while let Some(p) = parent {
            if depth >= bones.len() {
                break;
            }
            let Some(pb) = bones.get(p) else { break };
            depth += 1;
            parent = pb.parent;
        }
        depths.push(depth);
    }
    depths
}

pub fn score_skeleton(total_bones: usize, max_depth: usize, cfg: &ScoringConfig) -> f32 {
    let excess_depth = (max_depth as f32 - cfg.ideal_max_depth).max(0.0);
    let effective_depth = cfg.ideal_max_depth + excess_depth * cfg.bone_depth_factor;
    score_from(&[
        saturation(cfg.ideal_bone_count, total_bones as f32),
        saturation(cfg.ideal_max_depth, effective_depth),
    ])
}

pub fn analyze<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> SkeletonMetrics {
    let bones = pose.bones();
    let depths = bone_depths(bones);

    let mut has_child = vec![false; bones.len()];
    for bone in bones {
        if let Some(slot) = bone.parent.and_then(|p| has_child.get_mut(p)) {
            *slot = true;
        }
    }

    let total_bones = bones.len();
    let root_bones = bones.iter().filter(|b| b.parent.is_none()).count();
    let leaf_bones = has_child.iter().filter(|c| !**c).count();
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let average_depth = if total_bones == 0 {
        0.0
    } else {
        depths.iter().sum::<usize>() as f32 / total_bones as f32
    };

    SkeletonMetrics {
        total_bones,
        root_bones,
        leaf_bones,
        max_depth,
        average_depth,
        score: score_skeleton(total_bones, max_depth, cfg),
    }
}
