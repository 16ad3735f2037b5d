//! Capability interface over the 3D humanoid rig.
//!
//! The renderer-side model (bone graph, blend shapes) stays outside this
//! crate; the core only needs named setters. A rig missing a named bone or
//! expression reports `false` and the caller moves on; absence is never an
//! error.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::Vec3;

pub trait Rig {
    /// Set a named bone's Euler rotation. Returns `false` when the rig has
    /// no such bone.
    fn set_bone_rotation(&mut self, bone: &str, rotation: Vec3) -> bool;

    /// Expression (blend-shape) names the rig exposes.
    fn expression_names(&self) -> Vec<String>;

    /// Set a named expression's weight in `[0, 1]`. Returns `false` when the
    /// rig has no such expression.
    fn set_expression_weight(&mut self, name: &str, weight: f64) -> bool;

    /// Advance the rig's internal animation state by `delta_secs`.
    fn advance(&mut self, delta_secs: f64);
}

/// In-memory rig recording everything pushed into it. Test double, also
/// handy as a headless sink.
#[derive(Clone, Debug, Default)]
pub struct RecordingRig {
    bones: BTreeSet<String>,
    expressions: BTreeSet<String>,
    pub bone_rotations: BTreeMap<String, Vec3>,
    pub expression_weights: BTreeMap<String, f64>,
    pub advanced_secs: f64,
}

impl RecordingRig {
    /// A rig exposing the given bone and expression names.
    pub fn with_capabilities<S: Into<String>>(
        bones: impl IntoIterator<Item = S>,
        expressions: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            bones: bones.into_iter().map(Into::into).collect(),
            expressions: expressions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Rig for RecordingRig {
    fn set_bone_rotation(&mut self, bone: &str, rotation: Vec3) -> bool {
        if !self.bones.contains(bone) {
            return false;
        }
        self.bone_rotations.insert(bone.to_string(), rotation);
        true
    }

    fn expression_names(&self) -> Vec<String> {
        self.expressions.iter().cloned().collect()
    }

    fn set_expression_weight(&mut self, name: &str, weight: f64) -> bool {
        if !self.expressions.contains(name) {
            return false;
        }
        self.expression_weights.insert(name.to_string(), weight);
        true
    }

    fn advance(&mut self, delta_secs: f64) {
        self.advanced_secs += delta_secs;
    }
}
