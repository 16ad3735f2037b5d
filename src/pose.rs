//! Per-frame pose output: named bone rotations plus expression weights.

use std::collections::BTreeMap;

use crate::{core::Vec3, rig::Rig};

/// One frame's worth of computed animation state.
///
/// Keys are stable (`BTreeMap`) so the serialized form is deterministic;
/// this is the same record the telemetry sink ships out.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FramePose {
    pub bones: BTreeMap<String, Vec3>,
    pub expressions: BTreeMap<String, f64>,
}

impl FramePose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bone(&mut self, bone: &str, rotation: Vec3) {
        self.bones.insert(bone.to_string(), rotation);
    }

    /// Set an expression weight, clamped into `[0, 1]`.
    pub fn set_expression(&mut self, name: &str, weight: f64) {
        let weight = if weight.is_finite() { weight } else { 0.0 };
        self.expressions
            .insert(name.to_string(), weight.clamp(0.0, 1.0));
    }

    /// Add a rotation on top of whatever the bone already carries.
    pub fn add_bone(&mut self, bone: &str, rotation: Vec3) {
        let base = self.bones.get(bone).copied().unwrap_or(Vec3::ZERO);
        self.bones.insert(
            bone.to_string(),
            Vec3::new(base.x + rotation.x, base.y + rotation.y, base.z + rotation.z),
        );
    }

    pub fn all_expressions_zero(&self) -> bool {
        self.expressions.values().all(|w| *w == 0.0)
    }

    /// Every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.bones.values().all(|r| r.is_finite())
            && self.expressions.values().all(|w| w.is_finite())
    }

    /// Push the pose into a rig. Unknown bones/expressions are skipped.
    pub fn apply_to(&self, rig: &mut dyn Rig) {
        for (bone, rotation) in &self.bones {
            rig.set_bone_rotation(bone, *rotation);
        }
        for (name, weight) in &self.expressions {
            rig.set_expression_weight(name, *weight);
        }
    }
}
