//! Per-animation set of exercised slots, meshes, bones and constraints.
//!
//! Partial sets come from the frame pass and the timeline pass and are merged
//! with [`ActiveComponentSet::union`]. Union is commutative and associative, so
//! the order in which partial sets are combined never matters.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ConstraintFamily;

/// Composite `slot:attachment` key identifying a mesh binding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshKey {
    pub slot: String,
    pub attachment: String,
}

impl MeshKey {
    pub fn new(slot: impl Into<String>, attachment: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            attachment: attachment.into(),
        }
    }
}

impl fmt::Display for MeshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot, self.attachment)
    }
}

/// Names of live constraints per family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveConstraints {
    pub ik: BTreeSet<String>,
    pub transform: BTreeSet<String>,
    pub path: BTreeSet<String>,
    pub physics: BTreeSet<String>,
}

impl ActiveConstraints {
    pub fn family(&self, family: ConstraintFamily) -> &BTreeSet<String> {
        match family {
            ConstraintFamily::Ik => &self.ik,
            ConstraintFamily::Transform => &self.transform,
            ConstraintFamily::Path => &self.path,
            ConstraintFamily::Physics => &self.physics,
        }
    }

    pub fn family_mut(&mut self, family: ConstraintFamily) -> &mut BTreeSet<String> {
        match family {
            ConstraintFamily::Ik => &mut self.ik,
            ConstraintFamily::Transform => &mut self.transform,
            ConstraintFamily::Path => &mut self.path,
            ConstraintFamily::Physics => &mut self.physics,
        }
    }

    pub fn total(&self) -> usize {
        self.ik.len() + self.transform.len() + self.path.len() + self.physics.len()
    }

    fn union(mut self, other: Self) -> Self {
        self.ik.extend(other.ik);
        self.transform.extend(other.transform);
        self.path.extend(other.path);
        self.physics.extend(other.physics);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveComponentSet {
    pub slots: BTreeSet<String>,
    pub meshes: BTreeSet<MeshKey>,
    pub bones: BTreeSet<String>,
    pub has_clipping: bool,
    pub has_blend_modes: bool,
    pub has_physics: bool,
    pub has_ik: bool,
    pub has_transform: bool,
    pub has_path: bool,
    pub constraints: ActiveConstraints,
}

impl ActiveComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a constraint name and raise its family flag.
    pub fn mark_constraint(&mut self, family: ConstraintFamily, name: &str) {
        if !self.constraints.family(family).contains(name) {
            self.constraints.family_mut(family).insert(name.to_string());
        }
        *self.family_flag_mut(family) = true;
    }

    pub fn has_family(&self, family: ConstraintFamily) -> bool {
        match family {
            ConstraintFamily::Ik => self.has_ik,
            ConstraintFamily::Transform => self.has_transform,
            ConstraintFamily::Path => self.has_path,
            ConstraintFamily::Physics => self.has_physics,
        }
    }

    fn family_flag_mut(&mut self, family: ConstraintFamily) -> &mut bool {
        match family {
            ConstraintFamily::Ik => &mut self.has_ik,
            ConstraintFamily::Transform => &mut self.has_transform,
            ConstraintFamily::Path => &mut self.has_path,
            ConstraintFamily::Physics => &mut self.has_physics,
        }
    }

    /// Set union of two partial sets. Flags are OR-ed; nothing is ever removed.
    pub fn union(mut self, other: Self) -> Self {
        self.slots.extend(other.slots);
        self.meshes.extend(other.meshes);
        self.bones.extend(other.bones);
        self.has_clipping |= other.has_clipping;
        self.has_blend_modes |= other.has_blend_modes;
        self.has_physics |= other.has_physics;
        self.has_ik |= other.has_ik;
        self.has_transform |= other.has_transform;
        self.has_path |= other.has_path;
        self.constraints = self.constraints.union(other.constraints);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl FromIterator<ActiveComponentSet> for ActiveComponentSet {
    fn from_iter<I: IntoIterator<Item = ActiveComponentSet>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(slot: &str, ik: Option<&str>) -> ActiveComponentSet {
        let mut set = ActiveComponentSet::new();
        set.slots.insert(slot.to_string());
        if let Some(name) = ik {
            set.mark_constraint(ConstraintFamily::Ik, name);
        }
        set
    }

    #[test]
    fn union_is_order_independent() {
        let a = partial("head", Some("aim"));
        let b = partial("body", None);
        assert_eq!(a.clone().union(b.clone()), b.union(a));
    }

    #[test]
    fn union_never_drops_flags() {
        let mut a = partial("head", None);
        a.has_clipping = true;
        let merged = a.union(ActiveComponentSet::new());
        assert!(merged.has_clipping);
        assert!(merged.slots.contains("head"));
    }

    #[test]
    fn collect_merges_all() {
        let merged: ActiveComponentSet = vec![partial("a", Some("x")), partial("b", Some("y"))]
            .into_iter()
            .collect();
        assert_eq!(merged.slots.len(), 2);
        assert_eq!(merged.constraints.ik.len(), 2);
        assert!(merged.has_ik);
    }

    #[test]
    fn mesh_key_display() {
        assert_eq!(MeshKey::new("cape", "cape_mesh").to_string(), "cape:cape_mesh");
    }
}
