//! Active-element detection.
//!
//! [`observe_frame`] inspects one sampled pose; [`observe_timelines`] inspects
//! the timeline list of an animation without playing it. Both return partial
//! [`ActiveComponentSet`]s which callers merge with `union`.

use crate::active::{ActiveComponentSet, MeshKey};
use crate::model::{
    AnimationDescriptor, AttachmentKind, Bone, Constraint, ConstraintFamily, SkeletonView,
    TimelineTarget,
};

/// Add `bone` and every ancestor to the active bone set.
fn mark_bone_chain(bones: &[Bone], bone: usize, out: &mut ActiveComponentSet) {
    let mut current = Some(bone);
    // Bounded by the bone count so a malformed parent cycle cannot spin forever.
    for _ in 0..bones.len() {
        let Some(index) = current else { break };
        let Some(b) = bones.get(index) else { break };
        if !out.bones.contains(&b.name) {
            out.bones.insert(b.name.clone());
        }
        current = b.parent;
    }
}

fn observe_constraints<C: Constraint>(
    constraints: &[C],
    bones: &[Bone],
    out: &mut ActiveComponentSet,
) {
    for constraint in constraints.iter().filter(|c| c.is_live()) {
        out.mark_constraint(C::FAMILY, constraint.name());
        for bone in constraint.affected_bones() {
            match bones.get(bone) {
                Some(b) => {
                    out.bones.insert(b.name.clone());
                }
                None => log::debug!(
                    "constraint '{}' affects unknown bone {bone}",
                    constraint.name()
                ),
            }
        }
    }
}

/// Classify live slots, attachments, bones and constraints in the current pose.
pub fn observe_frame<S: SkeletonView + ?Sized>(pose: &S) -> ActiveComponentSet {
    let mut out = ActiveComponentSet::new();
    let bones = pose.bones();

    for slot in pose.slots() {
        if slot.alpha == 0.0 {
            continue;
        }
        let Some(attachment) = slot.attachment.as_ref() else {
            continue;
        };
        out.slots.insert(slot.name.clone());
        match &attachment.kind {
            AttachmentKind::Mesh(_) => {
                out.meshes
                    .insert(MeshKey::new(slot.name.clone(), attachment.name.clone()));
            }
            AttachmentKind::Clipping(_) => out.has_clipping = true,
            _ => {}
        }
        if !slot.blend.is_normal() {
            out.has_blend_modes = true;
        }
        mark_bone_chain(bones, slot.bone, &mut out);
    }

    observe_constraints(pose.ik_constraints(), bones, &mut out);
    observe_constraints(pose.transform_constraints(), bones, &mut out);
    observe_constraints(pose.path_constraints(), bones, &mut out);
    observe_constraints(pose.physics_constraints(), bones, &mut out);
    out
}

fn constraint_name<C: Constraint>(constraints: &[C], index: usize) -> Option<&str> {
    constraints.get(index).map(Constraint::name)
}

/// Classify every constraint and deformed mesh keyed by `animation`'s timelines,
/// regardless of runtime influence.
pub fn observe_timelines<S: SkeletonView + ?Sized>(
    pose: &S,
    animation: &AnimationDescriptor,
) -> ActiveComponentSet {
    let mut out = ActiveComponentSet::new();

    for timeline in &animation.timelines {
        let (family, name) = match timeline {
            TimelineTarget::IkConstraint { index } => (
                ConstraintFamily::Ik,
                constraint_name(pose.ik_constraints(), *index),
            ),
            TimelineTarget::TransformConstraint { index } => (
                ConstraintFamily::Transform,
                constraint_name(pose.transform_constraints(), *index),
            ),
            TimelineTarget::PathConstraint { index } => (
                ConstraintFamily::Path,
                constraint_name(pose.path_constraints(), *index),
            ),
            TimelineTarget::PhysicsConstraint { index: Some(index) } => (
                ConstraintFamily::Physics,
                constraint_name(pose.physics_constraints(), *index),
            ),
            TimelineTarget::PhysicsConstraint { index: None } => {
                for constraint in pose.physics_constraints() {
                    out.mark_constraint(ConstraintFamily::Physics, &constraint.name);
                }
                continue;
            }
            TimelineTarget::Deform { slot, attachment } => {
                match pose.slots().get(*slot) {
                    Some(s) => {
                        out.meshes
                            .insert(MeshKey::new(s.name.clone(), attachment.clone()));
                    }
                    None => log::debug!(
                        "deform timeline in '{}' targets unknown slot {slot}",
                        animation.name
                    ),
                }
                continue;
            }
            _ => continue,
        };

        match name {
            Some(name) => out.mark_constraint(family, name),
            None => log::debug!(
                "{family:?} timeline in '{}' targets a missing constraint",
                animation.name
            ),
        }
    }
    out
}
