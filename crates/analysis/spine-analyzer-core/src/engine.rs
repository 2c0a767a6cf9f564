//! Analyzer: runs the full pipeline over one asset and assembles the report.
//!
//! Pipeline per animation: sample (frame pass) → timeline pass → union →
//! category analyzers → overall score. Asset-wide passes run once up front.

use crate::active::ActiveComponentSet;
use crate::aggregate::{best_and_worst, median_score, overall_score};
use crate::analyzers::{self, ClippingMaskInfo};
use crate::config::AnalyzerConfig;
use crate::detect::{observe_frame, observe_timelines};
use crate::error::Result;
use crate::findings;
use crate::model::{AnimationDescriptor, PosePlayback};
use crate::report::{AnalysisResult, AnalysisStats, AnimationAnalysis};
use crate::sampler;
use crate::scoring::ScoreBand;

/// Active components of one animation plus the number of samples taken.
pub fn detect_active_components<P: PosePlayback + ?Sized>(
    pose: &mut P,
    animation: &AnimationDescriptor,
    sample_rate_hz: f32,
) -> Result<(ActiveComponentSet, usize)> {
    let mut sampled = ActiveComponentSet::new();
    let samples = sampler::sample(pose, animation, sample_rate_hz, |_, frame| {
        sampled = std::mem::take(&mut sampled).union(observe_frame(frame));
    })?;
    let keyed = observe_timelines(&*pose, animation);
    Ok((sampled.union(keyed), samples))
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    cfg: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer after validating `cfg`.
    pub fn new(cfg: AnalyzerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.cfg
    }

    /// Analyze one animation. `clip_inventory` is the asset's clipping mask
    /// inventory and `skeleton_score` the animation-independent skeleton score.
    pub fn analyze_animation<P: PosePlayback + ?Sized>(
        &self,
        pose: &mut P,
        animation: &AnimationDescriptor,
        clip_inventory: &[ClippingMaskInfo],
        skeleton_score: f32,
    ) -> Result<AnimationAnalysis> {
        let scoring = &self.cfg.scoring;
        let (active, sample_count) =
            detect_active_components(pose, animation, self.cfg.sample_rate_hz)?;

        let mesh = analyzers::mesh::analyze_for_animation(&*pose, animation, &active, scoring);
        let clipping = analyzers::clipping::analyze_for_animation(clip_inventory, &active, scoring);
        let blend_mode = analyzers::blend::analyze_for_animation(&*pose, &active, scoring);
        let constraint = analyzers::constraint::analyze_for_animation(&active, scoring);

        let mut analysis = AnimationAnalysis {
            name: animation.name.clone(),
            duration: animation.duration,
            sample_count,
            overall_score: 0.0,
            band: ScoreBand::Poor,
            skeleton_score,
            mesh,
            clipping,
            blend_mode,
            constraint,
            active_bones: active.bones.len(),
            active_components: active,
        };
        analysis.overall_score = overall_score(&analysis.category_scores(), &self.cfg.weights);
        analysis.band = ScoreBand::from_score(analysis.overall_score);

        log::debug!(
            "analyzed '{}': {} samples, overall {:.1}",
            analysis.name,
            analysis.sample_count,
            analysis.overall_score
        );
        Ok(analysis)
    }

    /// Analyze every animation of the pose model, one after another.
    ///
    /// The pose is mutated while sampling and left in its original track state.
    pub fn analyze<P: PosePlayback + ?Sized>(
        &self,
        pose: &mut P,
        asset_name: &str,
    ) -> Result<AnalysisResult> {
        let scoring = &self.cfg.scoring;

        let skeleton = analyzers::skeleton::analyze(&*pose, scoring);
        let mesh_analysis = analyzers::mesh::analyze_global(&*pose, scoring);
        let clipping_analysis = analyzers::clipping::analyze_global(&*pose, scoring);
        let blend_mode_analysis = analyzers::blend::analyze_global(&*pose, scoring);
        let physics_analysis = analyzers::constraint::analyze_global(&*pose, scoring);

        let descriptors: Vec<AnimationDescriptor> = pose.animations().to_vec();
        let mut animations = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            animations.push(self.analyze_animation(
                pose,
                descriptor,
                &clipping_analysis.masks,
                skeleton.score,
            )?);
        }

        let scores: Vec<f32> = animations.iter().map(|a| a.overall_score).collect();
        let median = median_score(&scores);
        let ranked = best_and_worst(&scores);
        let stats = self.stats(&animations);
        let findings = findings::collect(&skeleton, &clipping_analysis, &animations, &self.cfg);

        log::debug!(
            "analyzed asset '{asset_name}': {} animations, median {median:.1}",
            animations.len()
        );

        Ok(AnalysisResult {
            asset_name: asset_name.to_string(),
            total_animations: animations.len(),
            total_skins: pose.skins().len(),
            skeleton,
            animations,
            mesh_analysis,
            clipping_analysis,
            blend_mode_analysis,
            physics_analysis,
            median_score: median,
            overall_band: ScoreBand::from_score(median),
            best_animation: ranked.map(|(best, _)| best),
            worst_animation: ranked.map(|(_, worst)| worst),
            stats,
            findings,
        })
    }

    fn stats(&self, animations: &[AnimationAnalysis]) -> AnalysisStats {
        let thresholds = &self.cfg.thresholds;
        AnalysisStats {
            animations_with_physics: count_where(animations, |a| a.active_components.has_physics),
            animations_with_clipping: count_where(animations, |a| a.active_components.has_clipping),
            animations_with_blend_modes: count_where(animations, |a| {
                a.active_components.has_blend_modes
            }),
            animations_with_ik: count_where(animations, |a| a.active_components.has_ik),
            animations_with_transform: count_where(animations, |a| {
                a.active_components.has_transform
            }),
            animations_with_path: count_where(animations, |a| a.active_components.has_path),
            high_vertex_animations: count_where(animations, |a| {
                a.mesh.total_vertices > thresholds.high_vertex_count
            }),
            poor_score_animations: count_where(animations, |a| {
                a.overall_score < thresholds.poor_score
            }),
        }
    }
}

fn count_where(
    animations: &[AnimationAnalysis],
    pred: impl Fn(&AnimationAnalysis) -> bool,
) -> usize {
    animations.iter().filter(|a| pred(a)).count()
}

/// Analyze with the default configuration.
pub fn analyze<P: PosePlayback + ?Sized>(pose: &mut P, asset_name: &str) -> Result<AnalysisResult> {
    Analyzer::default().analyze(pose, asset_name)
}
