//! Category analyzers. Each turns an active-element set (or the whole pose,
//! for the global variants) into metrics with a 0..=100 score.

pub mod blend;
pub mod clipping;
pub mod constraint;
pub mod mesh;
pub mod skeleton;

pub use blend::{BlendModeGlobalAnalysis, BlendModeMetrics};
pub use clipping::{ClippingGlobalAnalysis, ClippingMaskInfo, ClippingMetrics};
pub use constraint::{ConstraintGlobalAnalysis, ConstraintMetrics, FamilyImpact};
pub use mesh::{MeshGlobalAnalysis, MeshInfo, MeshMetrics};
pub use skeleton::SkeletonMetrics;
