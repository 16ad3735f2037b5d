//! Per-phrase timelines in tick space, cached across frames.
//!
//! Tick conversion for a phrase happens once, when the phrase is first
//! observed with complete data; after that every per-frame lookup is a plain
//! range scan over cached bounds.

use crate::{
    expression::{MouthShape, map_expression},
    phoneme::{self, segment_phonemes},
    phrase::PhraseSnapshot,
    tempo::{frequency_to_note_number, seconds_to_tick},
};

/// One phoneme occurrence within a phrase, with frame and tick bounds and
/// its resolved expression target.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub symbol: String,
    pub start_frame: u64,
    pub frame_length: u64,
    pub start_tick: f64,
    pub end_tick: f64,
    pub shape: MouthShape,
    /// Blend weight in `[0, 1]` for how fully the shape is applied.
    pub weight: f64,
    /// Note number derived from the phrase f0 at the segment's start frame.
    pub note_number: Option<f64>,
}

impl Segment {
    /// Exclusive end frame.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frame_length
    }

    /// Inclusive containment on the tick axis.
    pub fn contains_tick(&self, tick: f64) -> bool {
        self.start_tick <= tick && tick <= self.end_tick
    }

    /// Segment duration in ticks.
    pub fn tick_length(&self) -> f64 {
        self.end_tick - self.start_tick
    }

    /// Zero-length silence segment used when no cached segment matches the
    /// playhead.
    pub fn silence_at(tick: f64) -> Self {
        let tick = if tick.is_finite() { tick } else { 0.0 };
        Self {
            symbol: phoneme::PAU.to_string(),
            start_frame: 0,
            frame_length: 0,
            start_tick: tick,
            end_tick: tick,
            shape: MouthShape::Silence,
            weight: 1.0,
            note_number: None,
        }
    }

    pub fn is_silence(&self) -> bool {
        self.symbol == phoneme::PAU
    }
}

/// Immutable tick-space timeline for one phrase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhraseTimeline {
    pub start_tick: f64,
    pub end_tick: f64,
    pub tpqn: u32,
    pub segments: Vec<Segment>,
}

impl PhraseTimeline {
    pub fn contains_tick(&self, tick: f64) -> bool {
        self.start_tick <= tick && tick <= self.end_tick
    }

    /// Build a timeline from a ready snapshot.
    ///
    /// Returns `None` when the snapshot is not ready or the frame rate is
    /// unusable; callers retry on a later frame.
    pub fn build(snapshot: &PhraseSnapshot, frame_rate: f64, consonant_weight: f64) -> Option<Self> {
        let query = snapshot.query.as_ref()?;
        let start_time = snapshot.start_time?;
        if !snapshot.is_ready() || !frame_rate.is_finite() || frame_rate <= 0.0 {
            return None;
        }

        let spans = segment_phonemes(&query.phonemes);

        // Boundary ticks: one conversion per segment edge, shared between
        // neighbors so tick bounds stay exactly contiguous.
        let mut boundaries = Vec::with_capacity(spans.len() + 1);
        boundaries.push(boundary_tick(snapshot, start_time, 0, frame_rate));
        for span in &spans {
            boundaries.push(boundary_tick(
                snapshot,
                start_time,
                span.end_frame(),
                frame_rate,
            ));
        }

        let segments = spans
            .iter()
            .enumerate()
            .map(|(i, span)| {
                let next_symbol = spans.get(i + 1).map(|s| s.symbol.as_str());
                let (shape, weight) =
                    map_expression(&span.symbol, next_symbol, consonant_weight);
                let note_number = query
                    .f0
                    .as_ref()
                    .and_then(|f0| f0.get(span.start_frame as usize))
                    .and_then(|hz| frequency_to_note_number(*hz));
                Segment {
                    symbol: span.symbol.clone(),
                    start_frame: span.start_frame,
                    frame_length: span.frame_length,
                    start_tick: boundaries[i],
                    end_tick: boundaries[i + 1],
                    shape,
                    weight,
                    note_number,
                }
            })
            .collect::<Vec<_>>();

        Some(Self {
            start_tick: boundaries[0],
            end_tick: *boundaries.last().unwrap_or(&boundaries[0]),
            tpqn: snapshot.tpqn,
            segments,
        })
    }
}

fn boundary_tick(snapshot: &PhraseSnapshot, start_time: f64, frame: u64, frame_rate: f64) -> f64 {
    let seconds = start_time + frame as f64 / frame_rate;
    seconds_to_tick(seconds, &snapshot.tempos, snapshot.tpqn)
}

/// Insertion-ordered cache of phrase timelines, keyed by phrase id.
///
/// At most one timeline exists per id; timelines are immutable once built
/// and dropped only when their phrase leaves the upstream set.
#[derive(Clone, Debug, Default)]
pub struct TimelineCache {
    entries: Vec<(String, PhraseTimeline)>,
}

impl TimelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, phrase_id: &str) -> Option<&PhraseTimeline> {
        self.entries
            .iter()
            .find(|(id, _)| id == phrase_id)
            .map(|(_, tl)| tl)
    }

    /// Cache a timeline for the snapshot's phrase.
    ///
    /// No-op when a timeline already exists for the id: later snapshots of
    /// a completed phrase never change its synthesis output, so they are not
    /// reprocessed. Returns the newly built timeline, or `None` when nothing
    /// was built (already cached, snapshot not ready, unusable frame rate).
    pub fn upsert(
        &mut self,
        snapshot: &PhraseSnapshot,
        frame_rate: f64,
        consonant_weight: f64,
    ) -> Option<&PhraseTimeline> {
        if self.get(&snapshot.id).is_some() {
            return None;
        }
        let timeline = PhraseTimeline::build(snapshot, frame_rate, consonant_weight)?;
        tracing::debug!(
            phrase = %snapshot.id,
            start_tick = timeline.start_tick,
            end_tick = timeline.end_tick,
            segments = timeline.segments.len(),
            "built phrase timeline"
        );
        self.entries.push((snapshot.id.clone(), timeline));
        self.entries.last().map(|(_, tl)| tl)
    }

    /// Drop timelines whose phrase id is absent from `current_ids`.
    ///
    /// Returns `true` when anything was removed (the caller must then
    /// recompute its last-end-tick from [`TimelineCache::max_end_tick`]).
    pub fn prune<S: AsRef<str>>(&mut self, current_ids: &[S]) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(id, _)| current_ids.iter().any(|c| c.as_ref() == id));
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(removed = before - self.entries.len(), "pruned phrase timelines");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Maximum end tick across surviving timelines, 0 when empty.
    pub fn max_end_tick(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, tl)| tl.end_tick)
            .fold(0.0, f64::max)
    }

    /// Find the segment under the playhead.
    ///
    /// Silence segments never match: when a trailing pause shares a boundary
    /// with the next phoneme's attack, the non-silence segment wins the tie.
    /// First match in insertion order then segment order is returned;
    /// timelines' tick ranges are assumed not to overlap.
    pub fn find_active_segment(&self, tick: f64) -> Option<&Segment> {
        self.entries
            .iter()
            .filter(|(_, tl)| tl.contains_tick(tick))
            .flat_map(|(_, tl)| tl.segments.iter())
            .find(|seg| !seg.is_silence() && seg.contains_tick(tick))
    }

    /// Like [`TimelineCache::find_active_segment`] but substituting the
    /// synthetic silence segment when nothing matches.
    pub fn active_segment(&self, tick: f64) -> Segment {
        self.find_active_segment(tick)
            .cloned()
            .unwrap_or_else(|| Segment::silence_at(tick))
    }
}
