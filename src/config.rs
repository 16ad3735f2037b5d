//! Per-avatar behavioral configuration.
//!
//! One parameterized profile covers every avatar variant; framing, gesture
//! thresholds and which reaction gestures are enabled are data, not code.

use crate::error::{CantomimeError, CantomimeResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AvatarProfile {
    /// Blend weight applied to transitional consonants borrowing the
    /// following vowel's mouth shape.
    pub consonant_weight: f64,
    /// Peak idle-sway rotation in radians.
    pub sway_amplitude: f64,
    /// Peak anticipatory rotation in radians, before the first phrase.
    pub anticipation_amplitude: f64,
    /// Head tilt in radians at full finale ramp.
    pub finale_head_tilt: f64,
    /// Finale expression ramp length in ticks.
    pub finale_ramp_ticks: f64,
    pub enable_long_note: bool,
    pub enable_high_note: bool,
    pub enable_finale: bool,
    /// Long-note gate: segment duration must exceed `tpqn * long_note_ratio`.
    pub long_note_ratio: f64,
    /// High-note gate: segment duration must exceed `tpqn * high_note_ratio`.
    pub high_note_ratio: f64,
    /// High-note gate: note number at segment start must exceed this.
    pub high_note_threshold: f64,
}

impl Default for AvatarProfile {
    fn default() -> Self {
        Self {
            consonant_weight: 0.7,
            sway_amplitude: 0.03,
            anticipation_amplitude: 0.015,
            finale_head_tilt: 0.1,
            finale_ramp_ticks: 24.0,
            enable_long_note: true,
            enable_high_note: false,
            enable_finale: true,
            long_note_ratio: 2.0,
            high_note_ratio: 1.0,
            high_note_threshold: 70.0,
        }
    }
}

impl AvatarProfile {
    pub fn validate(&self) -> CantomimeResult<()> {
        if !(0.0..=1.0).contains(&self.consonant_weight) {
            return Err(CantomimeError::validation(
                "consonant_weight must be within [0, 1]",
            ));
        }
        for (name, v) in [
            ("sway_amplitude", self.sway_amplitude),
            ("anticipation_amplitude", self.anticipation_amplitude),
            ("finale_head_tilt", self.finale_head_tilt),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CantomimeError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !self.finale_ramp_ticks.is_finite() || self.finale_ramp_ticks <= 0.0 {
            return Err(CantomimeError::validation(
                "finale_ramp_ticks must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("long_note_ratio", self.long_note_ratio),
            ("high_note_ratio", self.high_note_ratio),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CantomimeError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.high_note_threshold.is_finite() {
            return Err(CantomimeError::validation(
                "high_note_threshold must be finite",
            ));
        }
        Ok(())
    }
}
