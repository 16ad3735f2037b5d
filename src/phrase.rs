//! Read-only phrase snapshot types fed into the core once per frame.
//!
//! The voice-synthesis subsystem owns phrases; the animation core only sees
//! an immutable point-in-time view of them at the top of each frame call.

use std::collections::BTreeMap;

use crate::{phoneme::Phoneme, tempo::Tempo};

/// Point-in-time view of one phrase from the upstream phrase set.
///
/// `engine`, `query` and `start_time` are all `None` until the phrase has
/// been fully prepared upstream; a phrase missing any of them is not ready
/// and is skipped for the frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PhraseSnapshot {
    /// Opaque unique phrase key.
    pub id: String,
    /// Synthesis engine (singer) assignment.
    pub engine: Option<String>,
    /// Computed synthesis query.
    pub query: Option<PhraseQuery>,
    /// Absolute start time in seconds.
    pub start_time: Option<f64>,
    pub tempos: Vec<Tempo>,
    /// Ticks per quarter note.
    pub tpqn: u32,
}

/// Phoneme timing and pitch data produced by the synthesis engine.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PhraseQuery {
    pub phonemes: Vec<Phoneme>,
    /// Frame-indexed fundamental frequency in Hz; 0 marks unvoiced frames.
    pub f0: Option<Vec<f64>>,
}

impl PhraseSnapshot {
    /// `true` once singer, query and start time are all known.
    pub fn is_ready(&self) -> bool {
        self.engine.is_some() && self.query.is_some() && self.start_time.is_some()
    }
}

/// Per-engine synthesis frame-rate lookup.
pub trait FrameRateSource {
    /// Frames per second for the given engine, or `None` when unknown.
    fn frame_rate(&self, engine_id: &str) -> Option<f64>;
}

impl FrameRateSource for BTreeMap<String, f64> {
    fn frame_rate(&self, engine_id: &str) -> Option<f64> {
        self.get(engine_id).copied()
    }
}

/// Fixed frame rate for every engine.
#[derive(Clone, Copy, Debug)]
pub struct FixedFrameRate(pub f64);

impl FrameRateSource for FixedFrameRate {
    fn frame_rate(&self, _engine_id: &str) -> Option<f64> {
        Some(self.0)
    }
}
