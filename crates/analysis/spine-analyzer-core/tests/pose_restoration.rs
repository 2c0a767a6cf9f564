use spine_analyzer_core::model::{
    IkConstraint, PathConstraint, PhysicsConstraint, Skin, TransformConstraint,
};
use spine_analyzer_core::{
    analyze, sample, AnalyzerError, AnimationDescriptor, Bone, PlaybackError, PlaybackScope,
    PosePlayback, RigDefinition, RigModel, SkeletonView, Slot, TrackState,
};

fn hero() -> RigModel {
    let def: RigDefinition = spine_test_fixtures::rigs::load("hero").expect("hero fixture");
    RigModel::new(def)
}

fn descriptor(model: &RigModel, name: &str) -> AnimationDescriptor {
    model
        .animations()
        .iter()
        .find(|a| a.name == name)
        .cloned()
        .expect("animation exists")
}

/// Wraps a rig and fails on demand.
struct Flaky {
    inner: RigModel,
    fail_time_above: Option<f32>,
    refuse_animation: Option<String>,
}

impl Flaky {
    fn new(inner: RigModel) -> Self {
        Self {
            inner,
            fail_time_above: None,
            refuse_animation: None,
        }
    }
}

impl SkeletonView for Flaky {
    fn bones(&self) -> &[Bone] {
        self.inner.bones()
    }
    fn slots(&self) -> &[Slot] {
        self.inner.slots()
    }
    fn skins(&self) -> &[Skin] {
        self.inner.skins()
    }
    fn ik_constraints(&self) -> &[IkConstraint] {
        self.inner.ik_constraints()
    }
    fn transform_constraints(&self) -> &[TransformConstraint] {
        self.inner.transform_constraints()
    }
    fn path_constraints(&self) -> &[PathConstraint] {
        self.inner.path_constraints()
    }
    fn physics_constraints(&self) -> &[PhysicsConstraint] {
        self.inner.physics_constraints()
    }
    fn animations(&self) -> &[AnimationDescriptor] {
        self.inner.animations()
    }
}

impl PosePlayback for Flaky {
    fn track_state(&self) -> TrackState {
        self.inner.track_state()
    }
    fn set_animation(&mut self, name: Option<&str>, looping: bool) -> Result<(), PlaybackError> {
        if name.is_some() && name == self.refuse_animation.as_deref() {
            return Err(PlaybackError::new("refused"));
        }
        self.inner.set_animation(name, looping)
    }
    fn set_track_time(&mut self, time: f32) -> Result<(), PlaybackError> {
        if self.fail_time_above.is_some_and(|limit| time > limit) {
            return Err(PlaybackError::new(format!("seek to {time} failed")));
        }
        self.inner.set_track_time(time)
    }
    fn apply(&mut self) -> Result<(), PlaybackError> {
        self.inner.apply()
    }
    fn update_world_transforms(&mut self) -> Result<(), PlaybackError> {
        self.inner.update_world_transforms()
    }
}

#[test]
fn sample_visits_both_endpoints() {
    let mut model = hero();
    let idle = descriptor(&model, "idle");
    let mut times = Vec::new();
    let count = sample(&mut model, &idle, 30.0, |t, _| times.push(t)).unwrap();

    assert_eq!(count, 31);
    assert_eq!(times.len(), 31);
    assert_eq!(times.first().copied(), Some(0.0));
    assert_eq!(times.last().copied(), Some(1.0));
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn sample_observes_animated_pose() {
    let mut model = hero();
    let blink = descriptor(&model, "blink_glow");
    let mut peak = 0.0f32;
    sample(&mut model, &blink, 60.0, |_, pose| {
        let glow = pose.slots().iter().find(|s| s.name == "glow").unwrap();
        peak = peak.max(glow.alpha);
    })
    .unwrap();
    assert!(peak > 0.9, "peak alpha {peak}");

    let glow = model.slots().iter().find(|s| s.name == "glow").unwrap();
    assert_eq!(glow.alpha, 0.0);
}

#[test]
fn sample_restores_previous_track() {
    let mut model = hero();
    model.set_animation(Some("idle"), true).unwrap();
    model.set_track_time(0.75).unwrap();
    let before = model.track_state();

    let run = descriptor(&model, "run");
    sample(&mut model, &run, 30.0, |_, _| {}).unwrap();

    assert_eq!(model.track_state(), before);
}

#[test]
fn playback_failure_restores_and_reports() {
    let mut pose = Flaky::new(hero());
    pose.inner.set_animation(Some("idle"), true).unwrap();
    let before = pose.track_state();
    pose.fail_time_above = Some(0.25);

    let run = descriptor(&pose.inner, "run");
    let mut seen = 0usize;
    let err = sample(&mut pose, &run, 30.0, |_, _| seen += 1).unwrap_err();

    assert!(matches!(err, AnalyzerError::Playback { ref animation, .. } if animation == "run"));
    assert!(seen > 0);
    assert_eq!(pose.track_state(), before);
}

#[test]
fn restore_failure_is_reported() {
    let mut pose = Flaky::new(hero());
    pose.inner.set_animation(Some("idle"), false).unwrap();
    pose.refuse_animation = Some("idle".into());

    let run = descriptor(&pose.inner, "run");
    let err = sample(&mut pose, &run, 30.0, |_, _| {}).unwrap_err();
    assert!(matches!(err, AnalyzerError::Restore { ref animation, .. } if animation == "run"));
}

#[test]
fn analyze_propagates_playback_failure() {
    let mut pose = Flaky::new(hero());
    pose.fail_time_above = Some(0.1);
    let before = pose.track_state();

    let err = analyze(&mut pose, "hero").unwrap_err();
    assert!(matches!(err, AnalyzerError::Playback { ref animation, .. } if animation == "idle"));
    assert_eq!(pose.track_state(), before);
}

#[test]
fn scope_restores_on_drop() {
    let mut model = hero();
    model.set_animation(Some("idle"), true).unwrap();
    model.set_track_time(0.5).unwrap();
    let before = model.track_state();

    {
        let mut scope = PlaybackScope::acquire(&mut model);
        assert_eq!(scope.saved_state(), Some(&before));
        scope.set_animation(Some("run"), false).unwrap();
        scope.set_track_time(0.2).unwrap();
    }

    assert_eq!(model.track_state(), before);
}

#[test]
fn scope_release_restores_pose() {
    let mut model = hero();
    let setup_slots = model.slots().to_vec();

    let mut scope = PlaybackScope::acquire(&mut model);
    scope.set_animation(Some("pose_t"), false).unwrap();
    scope.apply().unwrap();
    assert!(scope.slots()[2].attachment.is_none());
    scope.release().unwrap();

    assert_eq!(model.track_state(), TrackState::default());
    assert_eq!(model.slots(), setup_slots.as_slice());
}
