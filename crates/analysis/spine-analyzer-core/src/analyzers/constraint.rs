//! Constraint cost across the IK, transform, path and physics families.

use serde::{Deserialize, Serialize};

use crate::active::ActiveComponentSet;
use crate::config::ScoringConfig;
use crate::model::{
    ConstraintFamily, IkConstraint, PathConstraint, PhysicsConstraint, SkeletonView,
    TransformConstraint,
};
use crate::scoring::{percent, saturation, score_from};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConstraintMetrics {
    pub active_ik: usize,
    pub active_transform: usize,
    pub active_path: usize,
    pub active_physics: usize,
    pub total_active_constraints: usize,
    pub score: f32,
}

impl Default for ConstraintMetrics {
    fn default() -> Self {
        Self {
            active_ik: 0,
            active_transform: 0,
            active_path: 0,
            active_physics: 0,
            total_active_constraints: 0,
            score: 100.0,
        }
    }
}

/// One family's share of the constraint count.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FamilyImpact {
    pub family: ConstraintFamily,
    pub count: usize,
    /// Share of all constraints, 0..=100.
    pub impact: f32,
    /// `impact` scaled by the family's configured weight.
    pub weighted_impact: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConstraintGlobalAnalysis {
    pub ik: Vec<IkConstraint>,
    pub transform: Vec<TransformConstraint>,
    pub path: Vec<PathConstraint>,
    pub physics: Vec<PhysicsConstraint>,
    pub total_constraints: usize,
    /// In family order: ik, transform, path, physics.
    pub impacts: Vec<FamilyImpact>,
    pub score: f32,
}

impl ConstraintGlobalAnalysis {
    pub fn impact(&self, family: ConstraintFamily) -> Option<&FamilyImpact> {
        self.impacts.iter().find(|i| i.family == family)
    }
}

pub fn family_weight(family: ConstraintFamily, cfg: &ScoringConfig) -> f32 {
    match family {
        ConstraintFamily::Ik => cfg.ik_weight,
        ConstraintFamily::Transform => cfg.transform_weight,
        ConstraintFamily::Path => cfg.path_weight,
        ConstraintFamily::Physics => cfg.physics_weight,
    }
}

pub fn score_constraints(
    ik: usize,
    transform: usize,
    path: usize,
    physics: usize,
    cfg: &ScoringConfig,
) -> f32 {
    let load = ik as f32 * cfg.ik_weight
        + transform as f32 * cfg.transform_weight
        + path as f32 * cfg.path_weight
        + physics as f32 * cfg.physics_weight;
    score_from(&[saturation(cfg.ideal_constraint_load, load)])
}

pub fn analyze_for_animation(active: &ActiveComponentSet, cfg: &ScoringConfig) -> ConstraintMetrics {
    let c = &active.constraints;
    let (ik, transform, path, physics) = (
        c.ik.len(),
        c.transform.len(),
        c.path.len(),
        c.physics.len(),
    );
    ConstraintMetrics {
        active_ik: ik,
        active_transform: transform,
        active_path: path,
        active_physics: physics,
        total_active_constraints: c.total(),
        score: score_constraints(ik, transform, path, physics, cfg),
    }
}

pub fn analyze_global<S: SkeletonView + ?Sized>(pose: &S, cfg: &ScoringConfig) -> ConstraintGlobalAnalysis {
    let counts = [
        (ConstraintFamily::Ik, pose.ik_constraints().len()),
        (ConstraintFamily::Transform, pose.transform_constraints().len()),
        (ConstraintFamily::Path, pose.path_constraints().len()),
        (ConstraintFamily::Physics, pose.physics_constraints().len()),
    ];
    let total: usize = counts.iter().map(|(_, n)| n).sum();

    let impacts = counts
        .iter()
        .map(|&(family, count)| {
            let impact = percent(count, total);
            FamilyImpact {
                family,
                count,
                impact,
                weighted_impact: impact * family_weight(family, cfg),
            }
        })
        .collect();

    ConstraintGlobalAnalysis {
        ik: pose.ik_constraints().to_vec(),
        transform: pose.transform_constraints().to_vec(),
        path: pose.path_constraints().to_vec(),
        physics: pose.physics_constraints().to_vec(),
        total_constraints: total,
        impacts,
        score: score_constraints(counts[0].1, counts[1].1, counts[2].1, counts[3].1, cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_weigh_differently() {
        let cfg = ScoringConfig::default();
        assert_eq!(score_constraints(0, 0, 0, 0, &cfg), 100.0);
        // 5 IK at weight 2 sits exactly on the ideal load of 10.
        assert_eq!(score_constraints(5, 0, 0, 0, &cfg), 100.0);
        let ik = score_constraints(6, 0, 0, 0, &cfg);
        let physics = score_constraints(0, 0, 0, 6, &cfg);
        assert!(physics < ik);
    }

    #[test]
    fn empty_active_set() {
        let metrics = analyze_for_animation(&ActiveComponentSet::new(), &ScoringConfig::default());
        assert_eq!(metrics, ConstraintMetrics::default());
    }
}
