//! Read/mutate contract for the external pose and animation model.
//!
//! Hosts convert their runtime skeleton into these types once (attachment
//! kinds are decided at construction time) and expose them through
//! [`SkeletonView`]. Playback is driven through [`PosePlayback`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bone in the current pose.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone; `None` for roots.
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub world_x: f32,
    #[serde(default)]
    pub world_y: f32,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

impl BlendMode {
    #[inline]
    pub fn is_normal(self) -> bool {
        matches!(self, BlendMode::Normal)
    }
}

/// Mesh attachment data relevant to cost estimation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MeshAttachment {
    /// Length of the world vertex buffer (two floats per vertex).
    pub world_vertices_length: usize,
    /// Bone weight list; empty for rigid meshes.
    #[serde(default)]
    pub bones: Vec<u32>,
    /// Name of the parent mesh for linked meshes.
    #[serde(default)]
    pub parent_mesh: Option<String>,
}

impl MeshAttachment {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.world_vertices_length / 2
    }

    #[inline]
    pub fn is_weighted(&self) -> bool {
        !self.bones.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClippingAttachment {
    pub world_vertices_length: usize,
    /// Slot index where clipping ends, if any.
    #[serde(default)]
    pub end_slot: Option<usize>,
}

impl ClippingAttachment {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.world_vertices_length / 2
    }
}

/// Closed set of attachment kinds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentKind {
    Region,
    Mesh(MeshAttachment),
    Clipping(ClippingAttachment),
    BoundingBox,
    Path,
    Point,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub kind: AttachmentKind,
}

impl Attachment {
    pub fn as_mesh(&self) -> Option<&MeshAttachment> {
        match &self.kind {
            AttachmentKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_clipping(&self) -> Option<&ClippingAttachment> {
        match &self.kind {
            AttachmentKind::Clipping(clip) => Some(clip),
            _ => None,
        }
    }
}

/// A slot in the current pose.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub name: String,
    pub bone: usize,
    /// Alpha component of the slot color.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub blend: BlendMode,
}

fn default_alpha() -> f32 {
    1.0
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SkinEntry {
    pub slot: usize,
    pub attachment: Attachment,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Skin {
    pub name: String,
    #[serde(default)]
    pub attachments: Vec<SkinEntry>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IkConstraint {
    pub name: String,
    pub bones: Vec<usize>,
    pub target: usize,
    #[serde(default)]
    pub mix: f32,
    #[serde(default)]
    pub softness: f32,
    #[serde(default = "default_bend")]
    pub bend_direction: i32,
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub stretch: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_bend() -> i32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransformConstraint {
    pub name: String,
    pub bones: Vec<usize>,
    /// Source bone the constrained bones follow.
    pub target: usize,
    #[serde(default)]
    pub mix_rotate: f32,
    #[serde(default)]
    pub mix_x: f32,
    #[serde(default)]
    pub mix_y: f32,
    #[serde(default)]
    pub mix_scale_x: f32,
    #[serde(default)]
    pub mix_scale_y: f32,
    #[serde(default)]
    pub mix_shear_y: f32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PathConstraint {
    pub name: String,
    pub bones: Vec<usize>,
    /// Slot holding the path attachment.
    pub target: usize,
    #[serde(default)]
    pub position: f32,
    #[serde(default)]
    pub spacing: f32,
    #[serde(default)]
    pub mix_rotate: f32,
    #[serde(default)]
    pub mix_x: f32,
    #[serde(default)]
    pub mix_y: f32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PhysicsConstraint {
    pub name: String,
    pub bone: usize,
    #[serde(default)]
    pub inertia: f32,
    #[serde(default)]
    pub strength: f32,
    #[serde(default)]
    pub damping: f32,
    #[serde(default)]
    pub mass_inverse: f32,
    #[serde(default)]
    pub wind: f32,
    #[serde(default)]
    pub gravity: f32,
    #[serde(default)]
    pub mix: f32,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Constraint families the analyzer distinguishes.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintFamily {
    Ik,
    Transform,
    Path,
    Physics,
}

/// Uniform view over the four constraint families.
pub trait Constraint {
    const FAMILY: ConstraintFamily;

    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
    /// Largest influence the constraint currently exerts.
    fn influence(&self) -> f32;
    fn affected_bones(&self) -> Vec<usize>;

    /// Active flag set and influence strictly positive.
    fn is_live(&self) -> bool {
        self.is_active() && self.influence() > 0.0
    }
}

impl Constraint for IkConstraint {
    const FAMILY: ConstraintFamily = ConstraintFamily::Ik;

    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn influence(&self) -> f32 {
        self.mix
    }
    fn affected_bones(&self) -> Vec<usize> {
        self.bones.clone()
    }
}

impl Constraint for TransformConstraint {
    const FAMILY: ConstraintFamily = ConstraintFamily::Transform;

    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn influence(&self) -> f32 {
        [
            self.mix_rotate,
            self.mix_x,
            self.mix_y,
            self.mix_scale_x,
            self.mix_scale_y,
            self.mix_shear_y,
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }
    fn affected_bones(&self) -> Vec<usize> {
        self.bones.clone()
    }
}

impl Constraint for PathConstraint {
    const FAMILY: ConstraintFamily = ConstraintFamily::Path;

    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn influence(&self) -> f32 {
        self.mix_rotate.max(self.mix_x).max(self.mix_y)
    }
    fn affected_bones(&self) -> Vec<usize> {
        self.bones.clone()
    }
    fn is_live(&self) -> bool {
        self.active && (self.mix_rotate > 0.0 || self.mix_x > 0.0 || self.mix_y > 0.0)
    }
}

impl Constraint for PhysicsConstraint {
    const FAMILY: ConstraintFamily = ConstraintFamily::Physics;

    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn influence(&self) -> f32 {
        self.mix
    }
    fn affected_bones(&self) -> Vec<usize> {
        vec![self.bone]
    }
}

/// The element a timeline keys.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineTarget {
    Bone { bone: usize },
    SlotAttachment { slot: usize },
    SlotColor { slot: usize },
    Deform { slot: usize, attachment: String },
    IkConstraint { index: usize },
    TransformConstraint { index: usize },
    PathConstraint { index: usize },
    /// `index: None` keys every physics constraint at once.
    PhysicsConstraint {
        #[serde(default)]
        index: Option<usize>,
    },
    DrawOrder,
    Event,
}

/// Timeline list of one animation, stripped of key data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationDescriptor {
    pub name: String,
    /// Duration in seconds.
    pub duration: f32,
    pub timelines: Vec<TimelineTarget>,
}

impl AnimationDescriptor {
    /// True if a deform timeline keys `attachment` on `slot`.
    pub fn deforms(&self, slot: usize, attachment: &str) -> bool {
        self.timelines.iter().any(|t| {
            matches!(t, TimelineTarget::Deform { slot: s, attachment: a } if *s == slot && a == attachment)
        })
    }
}

/// Track 0 state captured before sampling and restored afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackState {
    pub animation: Option<String>,
    pub time: f32,
    pub looping: bool,
}

/// Failure reported by the host while driving playback.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct PlaybackError {
    pub message: String,
}

impl PlaybackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Read-only access to the skeleton in its current pose.
pub trait SkeletonView {
    fn bones(&self) -> &[Bone];
    fn slots(&self) -> &[Slot];
    fn skins(&self) -> &[Skin];
    fn ik_constraints(&self) -> &[IkConstraint];
    fn transform_constraints(&self) -> &[TransformConstraint];
    fn path_constraints(&self) -> &[PathConstraint];
    fn physics_constraints(&self) -> &[PhysicsConstraint];
    fn animations(&self) -> &[AnimationDescriptor];

    fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots().iter().position(|s| s.name == name)
    }

    /// Look up an attachment by slot and name across every skin.
    fn find_attachment(&self, slot: usize, name: &str) -> Option<&Attachment> {
        self.skins()
            .iter()
            .flat_map(|skin| skin.attachments.iter())
            .find(|entry| entry.slot == slot && entry.attachment.name == name)
            .map(|entry| &entry.attachment)
    }
}

/// Drivable playback interface on a single shared pose.
pub trait PosePlayback: SkeletonView {
    fn track_state(&self) -> TrackState;
    /// Set the track 0 animation; `None` clears the track.
    fn set_animation(&mut self, name: Option<&str>, looping: bool) -> Result<(), PlaybackError>;
    fn set_track_time(&mut self, time: f32) -> Result<(), PlaybackError>;
    /// Apply the track to the pose at the current track time.
    fn apply(&mut self) -> Result<(), PlaybackError>;
    fn update_world_transforms(&mut self) -> Result<(), PlaybackError>;
}
