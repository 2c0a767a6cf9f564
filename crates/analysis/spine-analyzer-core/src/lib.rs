//! Spine Analyzer Core (engine-agnostic)
//!
//! Performance analysis for skeletal animation rigs. The analyzer plays each
//! animation over a host-provided pose model, detects which slots, meshes,
//! clipping masks, blend modes and constraints are exercised, scores each
//! feature category 0..=100 and aggregates the scores into an
//! [`AnalysisResult`].
//!
//! Hosts implement [`SkeletonView`] and [`PosePlayback`] for their runtime, or
//! snapshot it into a [`RigModel`].

pub mod active;
pub mod aggregate;
pub mod analyzers;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod findings;
pub mod model;
pub mod report;
pub mod rig;
pub mod sampler;
pub mod scoring;

// Re-exports for consumers (adapters)
pub use active::{ActiveComponentSet, ActiveConstraints, MeshKey};
pub use aggregate::CategoryScores;
pub use config::{AnalyzerConfig, CategoryWeights, ReportThresholds, ScoringConfig};
pub use engine::{analyze, detect_active_components, Analyzer};
pub use error::AnalyzerError;
pub use findings::{Finding, FindingKind, Severity};
pub use model::{
    AnimationDescriptor, Attachment, AttachmentKind, BlendMode, Bone, ConstraintFamily,
    PlaybackError, PosePlayback, SkeletonView, Slot, TimelineTarget, TrackState,
};
pub use report::{AnalysisResult, AnalysisStats, AnimationAnalysis};
pub use rig::{RigDefinition, RigModel};
pub use sampler::{sample, PlaybackScope};
pub use scoring::ScoreBand;
