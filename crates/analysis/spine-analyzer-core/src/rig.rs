//! Reference in-memory pose model.
//!
//! [`RigDefinition`] is a serde snapshot of a skeleton's setup pose, skins,
//! constraints and keyed animations. [`RigModel`] plays it back through
//! [`PosePlayback`]: `apply` resets to setup and evaluates every timeline of the
//! current track at the track time. Bones are expected parent-first.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::model::{
    AnimationDescriptor, Attachment, BlendMode, Bone, IkConstraint, PathConstraint,
    PhysicsConstraint, PlaybackError, PosePlayback, SkeletonView, Skin, Slot, TimelineTarget,
    TrackState, TransformConstraint,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RigBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local offset from the parent.
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RigSlot {
    pub name: String,
    pub bone: usize,
    #[serde(default = "one")]
    pub alpha: f32,
    /// Setup attachment, looked up in the skins.
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub blend: BlendMode,
}

fn one() -> f32 {
    1.0
}

/// One key. Which field is read depends on the timeline target:
/// `value` for color/constraint timelines, `attachment` for attachment
/// timelines (absent means hide), `translate` for bone timelines.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RigKey {
    pub time: f32,
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub translate: Option<[f32; 2]>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RigTimeline {
    pub target: TimelineTarget,
    #[serde(default)]
    pub keys: Vec<RigKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RigAnimation {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub timelines: Vec<RigTimeline>,
}

impl RigAnimation {
    pub fn descriptor(&self) -> AnimationDescriptor {
        AnimationDescriptor {
            name: self.name.clone(),
            duration: self.duration,
            timelines: self.timelines.iter().map(|t| t.target.clone()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RigDefinition {
    pub bones: Vec<RigBone>,
    #[serde(default)]
    pub slots: Vec<RigSlot>,
    #[serde(default)]
    pub skins: Vec<Skin>,
    #[serde(default)]
    pub ik: Vec<IkConstraint>,
    #[serde(default)]
    pub transform: Vec<TransformConstraint>,
    #[serde(default)]
    pub path: Vec<PathConstraint>,
    #[serde(default)]
    pub physics: Vec<PhysicsConstraint>,
    #[serde(default)]
    pub animations: Vec<RigAnimation>,
}

/// Numeric key value at `time`: linear between keys, held after the last,
/// `None` before the first.
fn sample_value(keys: &[RigKey], time: f32) -> Option<f32> {
    let keyed: Vec<(f32, f32)> = keys
        .iter()
        .filter_map(|k| k.value.map(|v| (k.time, v)))
        .collect();
    sample_linear(&keyed, time)
}

fn sample_linear(keys: &[(f32, f32)], time: f32) -> Option<f32> {
    let first = keys.first()?;
    if time < first.0 {
        return None;
    }
    let i = keys.iter().rposition(|(t, _)| *t <= time)?;
    match keys.get(i + 1) {
        Some(&(t1, v1)) => {
            let (t0, v0) = keys[i];
            let span = (t1 - t0).max(f32::EPSILON);
            let u = ((time - t0) / span).clamp(0.0, 1.0);
            Some(v0 + (v1 - v0) * u)
        }
        None => Some(keys[i].1),
    }
}

fn sample_translate(keys: &[RigKey], time: f32) -> Option<[f32; 2]> {
    let xs: Vec<(f32, f32)> = keys
        .iter()
        .filter_map(|k| k.translate.map(|v| (k.time, v[0])))
        .collect();
    let ys: Vec<(f32, f32)> = keys
        .iter()
        .filter_map(|k| k.translate.map(|v| (k.time, v[1])))
        .collect();
    Some([sample_linear(&xs, time)?, sample_linear(&ys, time)?])
}

/// Stepped attachment key at `time`; outer `None` before the first key.
fn sample_attachment(keys: &[RigKey], time: f32) -> Option<Option<&str>> {
    keys.iter()
        .rev()
        .find(|k| k.time <= time)
        .map(|k| k.attachment.as_deref())
}

#[derive(Clone, Debug)]
pub struct RigModel {
    def: RigDefinition,
    bones: Vec<Bone>,
    locals: Vec<[f32; 2]>,
    slots: Vec<Slot>,
    ik: Vec<IkConstraint>,
    transform: Vec<TransformConstraint>,
    path: Vec<PathConstraint>,
    physics: Vec<PhysicsConstraint>,
    descriptors: Vec<AnimationDescriptor>,
    animation_index: HashMap<String, usize>,
    track: TrackState,
}

impl From<RigDefinition> for RigModel {
    fn from(def: RigDefinition) -> Self {
        Self::new(def)
    }
}

impl RigModel {
    pub fn new(def: RigDefinition) -> Self {
        let descriptors = def.animations.iter().map(RigAnimation::descriptor).collect();
        let animation_index = def
            .animations
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), i))
            .collect();
        let mut model = Self {
            bones: Vec::new(),
            locals: Vec::new(),
            slots: Vec::new(),
            ik: Vec::new(),
            transform: Vec::new(),
            path: Vec::new(),
            physics: Vec::new(),
            descriptors,
            animation_index,
            track: TrackState::default(),
            def,
        };
        model.reset_to_setup();
        model.compute_world();
        model
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let def: RigDefinition =
            serde_json::from_str(json).map_err(|e| AnalyzerError::ModelParse(e.to_string()))?;
        Ok(Self::new(def))
    }

    pub fn definition(&self) -> &RigDefinition {
        &self.def
    }

    /// Attachment named `name` for `slot` in the first skin that has one.
    fn skin_attachment(&self, slot: usize, name: &str) -> Option<Attachment> {
        self.find_attachment(slot, name).cloned()
    }

    fn reset_to_setup(&mut self) {
        self.bones = self
            .def
            .bones
            .iter()
            .map(|b| Bone {
                name: b.name.clone(),
                parent: b.parent,
                world_x: 0.0,
                world_y: 0.0,
            })
            .collect();
        self.locals = self.def.bones.iter().map(|b| [b.x, b.y]).collect();
        self.ik = self.def.ik.clone();
        self.transform = self.def.transform.clone();
        self.path = self.def.path.clone();
        self.physics = self.def.physics.clone();

        let slots: Vec<Slot> = self
            .def
            .slots
            .iter()
            .enumerate()
            .map(|(index, s)| Slot {
                name: s.name.clone(),
                bone: s.bone,
                alpha: s.alpha,
                attachment: s
                    .attachment
                    .as_deref()
                    .and_then(|name| self.skin_attachment(index, name)),
                blend: s.blend,
            })
            .collect();
        self.slots = slots;
    }

    fn apply_timeline(&mut self, timeline_index: usize, anim_index: usize, time: f32) {
        let timeline = &self.def.animations[anim_index].timelines[timeline_index];
        let keys = &timeline.keys;
        match &timeline.target {
            TimelineTarget::Bone { bone } => {
                if let (Some(v), Some(local)) = (sample_translate(keys, time), self.locals.get_mut(*bone)) {
                    *local = v;
                }
            }
            TimelineTarget::SlotAttachment { slot } => {
                if let Some(name) = sample_attachment(keys, time) {
                    let attachment = name.and_then(|n| self.find_attachment(*slot, n).cloned());
                    if let Some(s) = self.slots.get_mut(*slot) {
                        s.attachment = attachment;
                    }
                }
            }
            TimelineTarget::SlotColor { slot } => {
                if let (Some(v), Some(s)) = (sample_value(keys, time), self.slots.get_mut(*slot)) {
                    s.alpha = v.clamp(0.0, 1.0);
                }
            }
            TimelineTarget::IkConstraint { index } => {
                if let (Some(v), Some(c)) = (sample_value(keys, time), self.ik.get_mut(*index)) {
                    c.mix = v;
                }
            }
            TimelineTarget::TransformConstraint { index } => {
                if let (Some(v), Some(c)) = (sample_value(keys, time), self.transform.get_mut(*index)) {
                    c.mix_rotate = v;
                    c.mix_x = v;
                    c.mix_y = v;
                    c.mix_scale_x = v;
                    c.mix_scale_y = v;
                    c.mix_shear_y = v;
                }
            }
            TimelineTarget::PathConstraint { index } => {
                if let (Some(v), Some(c)) = (sample_value(keys, time), self.path.get_mut(*index)) {
                    c.mix_rotate = v;
                    c.mix_x = v;
                    c.mix_y = v;
                }
            }
            TimelineTarget::PhysicsConstraint { index } => {
                if let Some(v) = sample_value(keys, time) {
                    match index {
                        Some(i) => {
                            if let Some(c) = self.physics.get_mut(*i) {
                                c.mix = v;
                            }
                        }
                        None => self.physics.iter_mut().for_each(|c| c.mix = v),
                    }
                }
            }
            TimelineTarget::Deform { .. } | TimelineTarget::DrawOrder | TimelineTarget::Event => {}
        }
    }

    fn compute_world(&mut self) {
        for i in 0..self.bones.len() {
            let [x, y] = self.locals[i];
            let (px, py) = match self.bones[i].parent {
                Some(p) if p < i => (self.bones[p].world_x, self.bones[p].world_y),
                _ => (0.0, 0.0),
            };
            self.bones[i].world_x = px + x;
            self.bones[i].world_y = py + y;
        }
    }
}

impl SkeletonView for RigModel {
    fn bones(&self) -> &[Bone] {
        &self.bones
    }
    fn slots(&self) -> &[Slot] {
        &self.slots
    }
    fn skins(&self) -> &[Skin] {
        &self.def.skins
    }
    fn ik_constraints(&self) -> &[IkConstraint] {
        &self.ik
    }
    fn transform_constraints(&self) -> &[TransformConstraint] {
        &self.transform
    }
    fn path_constraints(&self) -> &[PathConstraint] {
        &self.path
    }
    fn physics_constraints(&self) -> &[PhysicsConstraint] {
        &self.physics
    }
    fn animations(&self) -> &[AnimationDescriptor] {
        &self.descriptors
    }
}

impl PosePlayback for RigModel {
    fn track_state(&self) -> TrackState {
        self.track.clone()
    }

    fn set_animation(&mut self, name: Option<&str>, looping: bool) -> std::result::Result<(), PlaybackError> {
        match name {
            Some(name) if !self.animation_index.contains_key(name) => {
                Err(PlaybackError::new(format!("unknown animation '{name}'")))
            }
            _ => {
                self.track = TrackState {
                    animation: name.map(str::to_string),
                    time: 0.0,
                    looping,
                };
                Ok(())
            }
        }
    }

    fn set_track_time(&mut self, time: f32) -> std::result::Result<(), PlaybackError> {
        if !time.is_finite() || time < 0.0 {
            return Err(PlaybackError::new(format!("invalid track time {time}")));
        }
        self.track.time = time;
        Ok(())
    }

    fn apply(&mut self) -> std::result::Result<(), PlaybackError> {
        self.reset_to_setup();
        let Some(name) = self.track.animation.as_deref() else {
            return Ok(());
        };
        let Some(&anim_index) = self.animation_index.get(name) else {
            return Err(PlaybackError::new(format!("unknown animation '{name}'")));
        };
        let duration = self.def.animations[anim_index].duration;
        let time = if duration > 0.0 && self.track.looping {
            self.track.time % duration
        } else {
            self.track.time.min(duration.max(0.0))
        };
        for timeline in 0..self.def.animations[anim_index].timelines.len() {
            self.apply_timeline(timeline, anim_index, time);
        }
        Ok(())
    }

    fn update_world_transforms(&mut self) -> std::result::Result<(), PlaybackError> {
        self.compute_world();
        Ok(())
    }
}
