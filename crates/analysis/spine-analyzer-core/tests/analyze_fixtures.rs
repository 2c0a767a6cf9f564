use spine_analyzer_core::{
    analyze, AnalysisResult, AnalysisStats, Analyzer, AnalyzerConfig, AnalyzerError, FindingKind,
    PosePlayback, RigDefinition, RigModel, ScoreBand, SkeletonView,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn rig(name: &str) -> RigModel {
    let def: RigDefinition = spine_test_fixtures::rigs::load(name).expect("load rig fixture");
    RigModel::new(def)
}

fn strict_analyzer() -> Analyzer {
    let json = spine_test_fixtures::configs::json("strict").expect("strict config");
    let cfg = AnalyzerConfig::from_json_str(&json).expect("parse strict config");
    Analyzer::new(cfg).expect("strict config validates")
}

fn assert_scores_in_range(result: &AnalysisResult) {
    let in_range = |s: f32| (0.0..=100.0).contains(&s);
    assert!(in_range(result.median_score));
    assert!(in_range(result.skeleton.score));
    assert!(in_range(result.mesh_analysis.score));
    assert!(in_range(result.clipping_analysis.score));
    assert!(in_range(result.blend_mode_analysis.metrics.score));
    assert!(in_range(result.physics_analysis.score));
    for anim in &result.animations {
        assert!(in_range(anim.overall_score), "{}: {}", anim.name, anim.overall_score);
        let c = anim.category_scores();
        for s in [c.skeleton, c.mesh, c.clipping, c.blend_mode, c.constraint] {
            assert!(in_range(s), "{}: category score {s}", anim.name);
        }
    }
}

#[test]
fn every_fixture_rig_analyzes_within_bounds() {
    for key in spine_test_fixtures::rigs::keys() {
        let mut model = rig(&key);
        let result = analyze(&mut model, &key).expect("analysis succeeds");
        assert_eq!(result.asset_name, key);
        assert_eq!(result.total_animations, model.animations().len());
        assert_eq!(result.animations.len(), result.total_animations);
        assert_scores_in_range(&result);
    }
}

#[test]
fn fixture_configs_validate() {
    for key in spine_test_fixtures::configs::keys() {
        let cfg: AnalyzerConfig = spine_test_fixtures::configs::load(&key).unwrap();
        cfg.validate().unwrap();
    }
}

#[test]
fn rig_json_parses_or_reports() {
    let json = spine_test_fixtures::rigs::json("hero").unwrap();
    let model = RigModel::from_json_str(&json).unwrap();
    assert_eq!(model.bones().len(), 8);
    assert_eq!(model.animations().len(), 5);

    let err = RigModel::from_json_str(r#"{ "bones": 3 }"#).unwrap_err();
    assert!(matches!(err, AnalyzerError::ModelParse(_)));
}

#[test]
fn minimal_rig_scores_perfect() {
    let mut model = rig("minimal");
    let result = analyze(&mut model, "minimal").unwrap();

    assert_eq!(result.skeleton.total_bones, 1);
    assert_eq!(result.skeleton.max_depth, 0);
    approx(result.skeleton.score, 100.0, 1e-4);

    let wave = result.animation("wave").expect("wave analysed");
    assert_eq!(wave.sample_count, 31);
    assert_eq!(wave.mesh.score, 100.0);
    assert_eq!(wave.clipping.score, 100.0);
    assert_eq!(wave.blend_mode.score, 100.0);
    assert_eq!(wave.constraint.score, 100.0);
    approx(wave.overall_score, 100.0, 1e-3);
    assert_eq!(wave.band, ScoreBand::Excellent);
    assert!(wave.active_components.slots.contains("body"));
    assert_eq!(wave.active_bones, 1);

    assert_eq!(result.best_animation, Some(0));
    assert_eq!(result.worst_animation, Some(0));
    assert!(result.findings.is_empty(), "{:?}", result.findings);
}

#[test]
fn empty_asset_reports_neutral_median() {
    let mut model = rig("empty");
    let result = analyze(&mut model, "empty").unwrap();

    assert_eq!(result.total_animations, 0);
    assert!(result.animations.is_empty());
    assert_eq!(result.median_score, 100.0);
    assert_eq!(result.overall_band, ScoreBand::Excellent);
    assert!(result.best().is_none());
    assert!(result.worst().is_none());
    assert_eq!(result.stats, AnalysisStats::default());
    assert_eq!(result.skeleton.total_bones, 2);
    assert_eq!(result.skeleton.root_bones, 1);
    assert_eq!(result.skeleton.leaf_bones, 1);
}

#[test]
fn hero_setup_pose_activity() {
    let mut model = rig("hero");
    let result = analyze(&mut model, "hero").unwrap();
    assert_eq!(result.total_skins, 2);

    let idle = result.animation("idle").unwrap();
    let active = &idle.active_components;
    let slots: Vec<&str> = active.slots.iter().map(String::as_str).collect();
    assert_eq!(slots, vec!["body", "cape", "head", "mask", "shadow"]);
    assert!(active.has_clipping);
    assert!(active.has_blend_modes);
    assert!(!active.has_ik && !active.has_transform && !active.has_path && !active.has_physics);
    assert_eq!(idle.active_bones, 5);

    assert_eq!(idle.mesh.active_meshes, 2);
    assert_eq!(idle.mesh.total_vertices, 148);
    assert_eq!(idle.mesh.weighted_meshes, 1);
    assert_eq!(idle.mesh.deformed_meshes, 0);
    assert_eq!(idle.clipping.active_masks, 1);
    assert_eq!(idle.blend_mode.non_normal_count, 1);
    assert_eq!(idle.blend_mode.multiply_count, 1);
    assert_eq!(idle.constraint.total_active_constraints, 0);
}

#[test]
fn hero_animation_specific_activity() {
    let mut model = rig("hero");
    let result = analyze(&mut model, "hero").unwrap();

    let run = result.animation("run").unwrap();
    assert_eq!(run.sample_count, 16);
    assert!(run.active_components.has_physics);
    assert!(run.active_components.has_ik);
    assert_eq!(run.mesh.deformed_meshes, 1);
    assert_eq!(run.constraint.active_ik, 1);
    assert_eq!(run.constraint.active_physics, 1);

    let blink = result.animation("blink_glow").unwrap();
    assert!(blink.active_components.slots.contains("glow"));
    assert_eq!(blink.blend_mode.additive_count, 1);
    assert_eq!(blink.clipping.active_masks, 2);
    assert_eq!(blink.clipping.complex_masks, 1);

    let pose_t = result.animation("pose_t").unwrap();
    assert_eq!(pose_t.sample_count, 1);
    assert!(!pose_t.active_components.slots.contains("cape"));
    assert_eq!(pose_t.mesh.active_meshes, 1);
}

#[test]
fn hero_global_inventories() {
    let mut model = rig("hero");
    let result = analyze(&mut model, "hero").unwrap();

    let meshes = &result.mesh_analysis;
    assert_eq!(meshes.total_meshes, 3);
    assert_eq!(meshes.linked_meshes, 1);
    assert_eq!(meshes.weighted_meshes, 1);
    assert_eq!(meshes.deformed_meshes, 1);

    let clipping = &result.clipping_analysis;
    assert_eq!(clipping.total_masks, 2);
    assert_eq!(clipping.complex_masks, 1);

    let constraints = &result.physics_analysis;
    assert_eq!(constraints.ik.len(), 1);
    assert_eq!(constraints.transform.len(), 1);
    assert!(constraints.path.is_empty());
    assert_eq!(constraints.physics.len(), 1);
    assert_eq!(constraints.total_constraints, 3);

    assert_eq!(result.blend_mode_analysis.non_normal_slots.len(), 2);
}

#[test]
fn hero_stats_and_findings() {
    let mut model = rig("hero");
    let result = analyze(&mut model, "hero").unwrap();

    assert_eq!(result.stats.animations_with_physics, 1);
    assert_eq!(result.stats.animations_with_ik, 2);
    assert_eq!(result.stats.animations_with_transform, 0);
    assert_eq!(result.stats.animations_with_path, 0);
    assert_eq!(result.stats.animations_with_clipping, 5);
    assert_eq!(result.stats.animations_with_blend_modes, 5);

    assert!(matches!(
        result.findings.first().map(|f| &f.kind),
        Some(FindingKind::ComplexClippingMasks { masks: 1, max_vertices: 20 })
    ));
    assert!(result.findings.iter().any(|f| matches!(
        &f.kind,
        FindingKind::PhysicsInUse { animation, constraints: 1 } if animation == "run"
    )));
}

#[test]
fn strict_config_ranks_animations() {
    let analyzer = strict_analyzer();
    assert_eq!(analyzer.config().scoring.ideal_mesh_count, 1.0);
    let mut model = rig("hero");
    let result = analyzer.analyze(&mut model, "hero").unwrap();

    let names: Vec<&str> = result.animations.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["idle", "run", "blink_glow", "ghost_ik", "pose_t"]);

    let score = |name: &str| result.animation(name).unwrap().overall_score;
    approx(score("pose_t"), 87.5, 0.05);
    approx(score("idle"), 80.63, 0.05);
    approx(score("run"), 63.16, 0.05);
    approx(score("blink_glow"), 59.79, 0.05);
    assert_eq!(score("idle"), score("ghost_ik"));

    assert_eq!(result.best().map(|a| a.name.as_str()), Some("pose_t"));
    assert_eq!(result.worst().map(|a| a.name.as_str()), Some("blink_glow"));
    assert_eq!(result.median_score, score("idle"));
    assert_eq!(result.overall_band, ScoreBand::Good);
}

#[test]
fn analysis_is_idempotent() {
    let mut model = rig("hero");
    let first = analyze(&mut model, "hero").unwrap();
    let second = analyze(&mut model, "hero").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json(), second.to_json());
}

#[test]
fn analysis_restores_track_state() {
    let mut model = rig("hero");
    model.set_animation(Some("run"), true).unwrap();
    model.set_track_time(0.3).unwrap();
    model.apply().unwrap();
    model.update_world_transforms().unwrap();
    let before_track = model.track_state();
    let before_slots = model.slots().to_vec();
    let before_physics = model.physics_constraints().to_vec();

    analyze(&mut model, "hero").unwrap();

    assert_eq!(model.track_state(), before_track);
    assert_eq!(model.slots(), before_slots.as_slice());
    assert_eq!(model.physics_constraints(), before_physics.as_slice());
}

#[test]
fn result_serializes_with_snake_case_fields() {
    let mut model = rig("hero");
    let result = analyze(&mut model, "hero").unwrap();
    let json = result.to_json();

    assert_eq!(json["asset_name"], "hero");
    assert!(json["physics_analysis"].is_object());
    assert!(json["animations"][0]["overall_score"].is_number());
    assert_eq!(json["findings"][0]["kind"], "complex_clipping_masks");
    assert_eq!(json["findings"][0]["severity"], "warning");

    let parsed: AnalysisResult = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.asset_name, result.asset_name);
    assert_eq!(parsed.best_animation, result.best_animation);
    assert_eq!(parsed.stats, result.stats);
}
