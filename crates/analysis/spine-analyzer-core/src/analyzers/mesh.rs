//! Mesh cost: active meshes per animation and the skin-wide mesh inventory.

use serde::{Deserialize, Serialize};

use crate::active::ActiveComponentSet;
use crate::config::ScoringConfig;
use crate::model::{AnimationDescriptor, MeshAttachment, SkeletonView, TimelineTarget};
use crate::scoring::{penalized, saturation, score_from};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshMetrics {
    pub active_meshes: usize,
    pub total_vertices: usize,
    pub weighted_meshes: usize,
    pub deformed_meshes: usize,
    pub score: f32,
}

impl Default for MeshMetrics {
    fn default() -> Self {
        Self {
            active_meshes: 0,
            total_vertices: 0,
            weighted_meshes: 0,
            deformed_meshes: 0,
            score: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshInfo {
    pub slot: String,
    pub attachment: String,
    pub skin: String,
    pub vertex_count: usize,
    pub is_weighted: bool,
    pub has_parent_mesh: bool,
    /// Keyed by a deform timeline in at least one animation.
    pub is_deformed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshGlobalAnalysis {
    pub meshes: Vec<MeshInfo>,
    pub total_meshes: usize,
    pub total_vertices: usize,
    pub weighted_meshes: usize,
    pub linked_meshes: usize,
    pub deformed_meshes: usize,
    pub score: f32,
}

pub fn score_meshes(
    meshes: usize,
    vertices: usize,
    deformed: usize,
    weighted: usize,
    cfg: &ScoringConfig,
) -> f32 {
    let load = penalized(meshes, deformed, cfg.mesh_deformed_factor)
        + weighted as f32 * (cfg.mesh_weighted_factor - 1.0).max(0.0);
    score_from(&[
        saturation(cfg.ideal_mesh_count, load),
        saturation(cfg.ideal_vertex_count, vertices as f32),
    ])
}

fn resolve_mesh<'a, S: SkeletonView + ?Sized>(
    pose: &'a S,
    slot: usize,
    attachment: &str,
) -> Option<&'a MeshAttachment> {
    let bound = pose.slots()[slot]
        .attachment
        .as_ref()
        .filter(|a| a.name == attachment);
    bound
        .or_else(|| pose.find_attachment(slot, attachment))
        .and_then(|a| a.as_mesh())
}

pub fn analyze_for_animation<S: SkeletonView + ?Sized>(
    pose: &S,
    animation: &AnimationDescriptor,
    active: &ActiveComponentSet,
    cfg: &ScoringConfig,
) -> MeshMetrics {
    let mut metrics = MeshMetrics::default();

    for key in &active.meshes {
        let Some(slot) = pose.slot_index(&key.slot) else {
            log::debug!("active mesh {key} has no slot in the pose");
            continue;
        };
        let Some(mesh) = resolve_mesh(pose, slot, &key.attachment) else {
            log::debug!("active mesh {key} does not resolve to a mesh attachment");
            continue;
        };

        metrics.active_meshes += 1;
        metrics.total_vertices += mesh.vertex_count();
        if mesh.is_weighted() {
            metrics.weighted_meshes += 1;
        }
        if animation.deforms(slot, &key.attachment) {
            metrics.deformed_meshes += 1;
        }
    }

    metrics.score = score_meshes(
        metrics.active_meshes,
        metrics.total_vertices,
        metrics.deformed_meshes,
        metrics.weighted_meshes,
        cfg,
    );
    metrics
}

pub fn analyze_global<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> MeshGlobalAnalysis {
    let deformed_anywhere = |slot: usize, name: &str| {
        pose.animations().iter().any(|anim| {
            anim.timelines.iter().any(|t| {
                matches!(t, TimelineTarget::Deform { slot: s, attachment } if *s == slot && attachment == name)
            })
        })
    };

    let mut meshes = Vec::new();
    for skin in pose.skins() {
        for entry in &skin.attachments {
            let Some(mesh) = entry.attachment.as_mesh() else {
                continue;
            };
            let Some(slot) = pose.slots().get(entry.slot) else {
                log::debug!(
                    "skin '{}' mesh '{}' references unknown slot {}",
                    skin.name,
                    entry.attachment.name,
                    entry.slot
                );
                continue;
            };
            meshes.push(MeshInfo {
                slot: slot.name.clone(),
                attachment: entry.attachment.name.clone(),
                skin: skin.name.clone(),
                vertex_count: mesh.vertex_count(),
                is_weighted: mesh.is_weighted(),
                has_parent_mesh: mesh.parent_mesh.is_some(),
                is_deformed: deformed_anywhere(entry.slot, &entry.attachment.name),
            });
        }
    }

    let total_meshes = meshes.len();
    let total_vertices = meshes.iter().map(|m| m.vertex_count).sum();
    let weighted_meshes = meshes.iter().filter(|m| m.is_weighted).count();
    let linked_meshes = meshes.iter().filter(|m| m.has_parent_mesh).count();
    let deformed_meshes = meshes.iter().filter(|m| m.is_deformed).count();

    MeshGlobalAnalysis {
        score: score_meshes(total_meshes, total_vertices, deformed_meshes, weighted_meshes, cfg),
        meshes,
        total_meshes,
        total_vertices,
        weighted_meshes,
        linked_meshes,
        deformed_meshes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_meshes_scores_full() {
        assert_eq!(score_meshes(0, 0, 0, 0, &ScoringConfig::default()), 100.0);
    }

    #[test]
    fn deformation_and_weights_cost_more() {
        let cfg = ScoringConfig::default();
        let rigid = score_meshes(15, 200, 0, 0, &cfg);
        let deformed = score_meshes(15, 200, 5, 0, &cfg);
        let weighted = score_meshes(15, 200, 0, 5, &cfg);
        assert_eq!(rigid, 100.0);
        assert!(deformed < rigid);
        assert!(weighted < deformed);
    }

    #[test]
    fn vertices_past_ideal_cost() {
        let cfg = ScoringConfig::default();
        assert_eq!(score_meshes(1, 600, 0, 0, &cfg), 50.0);
    }
}
