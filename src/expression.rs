//! Mapping from phoneme symbols to mouth-shape expression targets.

/// Named facial blend-shape targets driven by the animation core.
///
/// Vowel shapes carry the standard five-vowel naming used by humanoid avatar
/// rigs; `Silence` renders as the neutral (closed-mouth) expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MouthShape {
    Aa,
    Ih,
    Ou,
    Ee,
    Oh,
    Silence,
}

impl MouthShape {
    /// Expression name as exposed to the rig.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aa => "aa",
            Self::Ih => "ih",
            Self::Ou => "ou",
            Self::Ee => "ee",
            Self::Oh => "oh",
            Self::Silence => "neutral",
        }
    }
}

/// Expression names for transient reaction gestures.
pub mod reactions {
    pub const LONG_NOTE: &str = "long_note";
    pub const FINALE: &str = "finale";
    pub const NEUTRAL: &str = "neutral";
}

/// Map a primary vowel symbol to its mouth shape.
pub fn vowel_shape(symbol: &str) -> Option<MouthShape> {
    match symbol {
        "a" => Some(MouthShape::Aa),
        "i" => Some(MouthShape::Ih),
        "u" => Some(MouthShape::Ou),
        "e" => Some(MouthShape::Ee),
        "o" => Some(MouthShape::Oh),
        _ => None,
    }
}

/// `true` for symbols whose articulation closes the mouth: bilabials,
/// nasals, voiced labiodental, and pause.
fn is_closure_class(symbol: &str) -> bool {
    matches!(
        symbol,
        "m" | "b" | "p" | "my" | "by" | "py" | "N" | "v" | "pau"
    )
}

/// Resolve a phoneme symbol to `(mouth shape, blend weight)`.
///
/// Consonants outside the closure class borrow the following vowel's shape
/// at `consonant_weight` (a lookahead coarticulation approximation). When no
/// recognized vowel follows, the rounded `ou` shape is the default.
pub fn map_expression(
    symbol: &str,
    next_symbol: Option<&str>,
    consonant_weight: f64,
) -> (MouthShape, f64) {
    if is_closure_class(symbol) {
        return (MouthShape::Silence, 1.0);
    }
    if symbol == "w" {
        return (MouthShape::Ou, consonant_weight);
    }
    if let Some(shape) = vowel_shape(symbol) {
        return (shape, 1.0);
    }
    let borrowed = next_symbol.and_then(vowel_shape).unwrap_or(MouthShape::Ou);
    (borrowed, consonant_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CW: f64 = 0.7;

    #[test]
    fn closure_class_maps_to_silence_full_weight() {
        for s in ["m", "b", "p", "my", "by", "py", "N", "v", "pau"] {
            assert_eq!(map_expression(s, Some("a"), CW), (MouthShape::Silence, 1.0));
        }
    }

    #[test]
    fn primary_vowels_map_full_weight() {
        assert_eq!(map_expression("a", None, CW), (MouthShape::Aa, 1.0));
        assert_eq!(map_expression("i", None, CW), (MouthShape::Ih, 1.0));
        assert_eq!(map_expression("u", None, CW), (MouthShape::Ou, 1.0));
        assert_eq!(map_expression("e", None, CW), (MouthShape::Ee, 1.0));
        assert_eq!(map_expression("o", None, CW), (MouthShape::Oh, 1.0));
    }

    #[test]
    fn w_is_rounded_at_consonant_weight() {
        assert_eq!(map_expression("w", Some("a"), CW), (MouthShape::Ou, CW));
    }

    #[test]
    fn consonant_borrows_following_vowel() {
        assert_eq!(map_expression("k", Some("i"), CW), (MouthShape::Ih, CW));
        assert_eq!(map_expression("s", Some("o"), CW), (MouthShape::Oh, CW));
    }

    #[test]
    fn consonant_without_vowel_defaults_to_ou() {
        assert_eq!(map_expression("z", None, CW), (MouthShape::Ou, CW));
        assert_eq!(map_expression("z", Some("k"), CW), (MouthShape::Ou, CW));
    }

    #[test]
    fn closure_class_ignores_lookahead() {
        // "b" is explicit closure class, never the lookahead branch.
        assert_eq!(map_expression("b", None, CW), (MouthShape::Silence, 1.0));
    }
}
