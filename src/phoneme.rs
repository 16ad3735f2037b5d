//! Phoneme events and the frame-space segmenter.

/// Phoneme symbol used by synthesis engines for silence/pause.
pub const PAU: &str = "pau";

/// One phoneme event as reported by the synthesis query: a symbol and its
/// duration in synthesis frames.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Phoneme {
    pub symbol: String,
    pub frame_length: u64,
}

impl Phoneme {
    pub fn new(symbol: impl Into<String>, frame_length: u64) -> Self {
        Self {
            symbol: symbol.into(),
            frame_length,
        }
    }
}

/// Frame-space placement of one phoneme within its phrase: `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub symbol: String,
    pub start_frame: u64,
    pub frame_length: u64,
}

impl FrameSpan {
    /// Exclusive end frame.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frame_length
    }
}

/// Convert an ordered phoneme list into contiguous frame spans.
///
/// The output has one span per input phoneme; bounds are a running sum of
/// frame lengths starting at 0. Zero-length phonemes pass through unchanged.
pub fn segment_phonemes(phonemes: &[Phoneme]) -> Vec<FrameSpan> {
    let mut spans = Vec::with_capacity(phonemes.len());
    let mut cursor = 0u64;
    for p in phonemes {
        spans.push(FrameSpan {
            symbol: p.symbol.clone(),
            start_frame: cursor,
            frame_length: p.frame_length,
        });
        cursor += p.frame_length;
    }
    spans
}
