#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    CosineIn,
    CosineOut,
    CosineInOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CosineIn => 1.0 - (t * std::f64::consts::FRAC_PI_2).cos(),
            Self::CosineOut => (t * std::f64::consts::FRAC_PI_2).sin(),
            Self::CosineInOut => 0.5 - 0.5 * (t * std::f64::consts::PI).cos(),
        }
    }
}

/// Idle-sway phase curve: a 0..1 breathing cycle approximated by four
/// linear/constant pieces (rise, hold, fall, rest).
///
/// `t` is the repeating bar phase in `[0, 1)`; out-of-range or non-finite
/// input clamps to the rest value.
pub fn breathe_phase(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let t = t.clamp(0.0, 1.0);
    if t < 0.3 {
        t / 0.3
    } else if t < 0.5 {
        1.0
    } else if t < 0.8 {
        1.0 - (t - 0.5) / 0.3
    } else {
        0.0
    }
}
