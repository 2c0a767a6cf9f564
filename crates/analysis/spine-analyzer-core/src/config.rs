//! Analyzer configuration: sampling rate, scoring constants and report thresholds.
//!
//! The scoring constants are tuning policy. Defaults are documented here and
//! every value can be overridden from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 30.0;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Samples per second of animation time.
    pub sample_rate_hz: f32,
    pub scoring: ScoringConfig,
    pub weights: CategoryWeights,
    pub thresholds: ReportThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            scoring: ScoringConfig::default(),
            weights: CategoryWeights::default(),
            thresholds: ReportThresholds::default(),
        }
    }
}

/// Ideal values and penalty factors used by the category scores.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub ideal_bone_count: f32,
    pub ideal_max_depth: f32,
    /// Multiplier applied to each level of depth past `ideal_max_depth`.
    pub bone_depth_factor: f32,

    pub ideal_mesh_count: f32,
    pub ideal_vertex_count: f32,
    pub mesh_deformed_factor: f32,
    pub mesh_weighted_factor: f32,

    pub ideal_clipping_count: f32,
    /// Masks with more vertices than this count as complex.
    pub clipping_vertex_threshold: usize,
    pub complex_clipping_factor: f32,

    pub ideal_blend_mode_count: f32,

    pub ik_weight: f32,
    pub transform_weight: f32,
    pub path_weight: f32,
    pub physics_weight: f32,
    pub ideal_constraint_load: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ideal_bone_count: 30.0,
            ideal_max_depth: 5.0,
            bone_depth_factor: 1.5,
            ideal_mesh_count: 15.0,
            ideal_vertex_count: 300.0,
            mesh_deformed_factor: 1.5,
            mesh_weighted_factor: 2.0,
            ideal_clipping_count: 2.0,
            clipping_vertex_threshold: 8,
            complex_clipping_factor: 2.0,
            ideal_blend_mode_count: 2.0,
            ik_weight: 2.0,
            transform_weight: 1.5,
            path_weight: 2.5,
            physics_weight: 4.0,
            ideal_constraint_load: 10.0,
        }
    }
}

/// Share of each category in the overall score. Must sum to 1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryWeights {
    pub skeleton: f32,
    pub mesh: f32,
    pub clipping: f32,
    pub blend_mode: f32,
    pub constraint: f32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            skeleton: 0.15,
            mesh: 0.25,
            clipping: 0.20,
            blend_mode: 0.15,
            constraint: 0.25,
        }
    }
}

impl CategoryWeights {
    pub fn sum(&self) -> f32 {
        self.skeleton + self.mesh + self.clipping + self.blend_mode + self.constraint
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportThresholds {
    /// Animations whose active meshes exceed this many vertices are flagged.
    pub high_vertex_count: usize,
    /// Overall scores strictly below this are counted as poor.
    pub poor_score: f32,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            high_vertex_count: 500,
            poor_score: 55.0,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidConfig {
            field,
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}

fn penalty(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidConfig {
            field,
            reason: format!("penalty factor must be finite and >= 1, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidConfig {
            field,
            reason: format!("must be finite and >= 0, got {value}"),
        })
    }
}

impl AnalyzerConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: AnalyzerConfig =
            serde_json::from_str(json).map_err(|e| AnalyzerError::ConfigParse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        positive("sample_rate_hz", self.sample_rate_hz)?;
        self.scoring.validate()?;

        let w = &self.weights;
        non_negative("weights.skeleton", w.skeleton)?;
        non_negative("weights.mesh", w.mesh)?;
        non_negative("weights.clipping", w.clipping)?;
        non_negative("weights.blend_mode", w.blend_mode)?;
        non_negative("weights.constraint", w.constraint)?;
        let sum = w.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalyzerError::InvalidConfig {
                field: "weights",
                reason: format!("category weights must sum to 1, got {sum}"),
            });
        }

        if !(self.thresholds.poor_score.is_finite()
            && (0.0..=100.0).contains(&self.thresholds.poor_score))
        {
            return Err(AnalyzerError::InvalidConfig {
                field: "thresholds.poor_score",
                reason: format!("must be within [0, 100], got {}", self.thresholds.poor_score),
            });
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        positive("scoring.ideal_bone_count", self.ideal_bone_count)?;
        positive("scoring.ideal_max_depth", self.ideal_max_depth)?;
        penalty("scoring.bone_depth_factor", self.bone_depth_factor)?;
        positive("scoring.ideal_mesh_count", self.ideal_mesh_count)?;
        positive("scoring.ideal_vertex_count", self.ideal_vertex_count)?;
        penalty("scoring.mesh_deformed_factor", self.mesh_deformed_factor)?;
        penalty("scoring.mesh_weighted_factor", self.mesh_weighted_factor)?;
        positive("scoring.ideal_clipping_count", self.ideal_clipping_count)?;
        penalty("scoring.complex_clipping_factor", self.complex_clipping_factor)?;
        positive("scoring.ideal_blend_mode_count", self.ideal_blend_mode_count)?;
        penalty("scoring.ik_weight", self.ik_weight)?;
        penalty("scoring.transform_weight", self.transform_weight)?;
        penalty("scoring.path_weight", self.path_weight)?;
        penalty("scoring.physics_weight", self.physics_weight)?;
        positive("scoring.ideal_constraint_load", self.ideal_constraint_load)?;
        Ok(())
    }
}
