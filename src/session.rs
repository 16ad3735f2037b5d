//! Per-avatar animation session: the pose blender and its state machine.
//!
//! One session exists per active avatar view, owned by that view's
//! lifecycle. All state (cached timelines, carried scalars, ending
//! sub-state) lives here, never in globals. The whole per-frame computation
//! is synchronous and runs inside the caller's render callback.

use crate::{
    config::AvatarProfile,
    core::{Vec3, bones},
    ease::{Ease, breathe_phase},
    error::{CantomimeError, CantomimeResult},
    expression::{MouthShape, reactions},
    phrase::{FrameRateSource, PhraseSnapshot},
    pose::FramePose,
    timeline::{Segment, TimelineCache},
};

/// Ticks per quarter note assumed before any phrase has been observed.
const FALLBACK_TPQN: f64 = 480.0;

/// End-of-content sub-state.
///
/// Entering decay captures the rotation at that instant; the captured value
/// is what eases toward rest, so the decay start is seamless regardless of
/// where the sway cycle happened to be.
#[derive(Clone, Copy, Debug, PartialEq)]
enum EndingState {
    NotEnded,
    Decaying { from: Vec3 },
    Ended,
}

/// Real-time animation driver for one avatar view.
pub struct AnimationSession {
    profile: AvatarProfile,
    cache: TimelineCache,
    last_tpqn: f64,
    last_end_tick: f64,
    ending: EndingState,
    active: bool,
}

impl AnimationSession {
    pub fn new(profile: AvatarProfile) -> CantomimeResult<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            cache: TimelineCache::new(),
            last_tpqn: FALLBACK_TPQN,
            last_end_tick: 0.0,
            ending: EndingState::NotEnded,
            active: true,
        })
    }

    /// Re-enable a deactivated session. State was already reset on
    /// deactivation, so this starts from empty.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop the session and release everything it cached. Nothing survives
    /// into a later [`AnimationSession::activate`].
    pub fn deactivate(&mut self) {
        self.active = false;
        self.cache.clear();
        self.last_tpqn = FALLBACK_TPQN;
        self.last_end_tick = 0.0;
        self.ending = EndingState::NotEnded;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Cached phrase timelines, shared with sibling consumers (e.g. pitch
    /// visualization) that read the same derived data.
    pub fn timelines(&self) -> &TimelineCache {
        &self.cache
    }

    pub fn last_end_tick(&self) -> f64 {
        self.last_end_tick
    }

    pub fn last_tpqn(&self) -> f64 {
        self.last_tpqn
    }

    /// Absorb the current phrase set snapshot: drop timelines for phrases
    /// that disappeared, build timelines for newly ready phrases, and keep
    /// the carried scalars consistent.
    fn sync_phrases(&mut self, snapshots: &[PhraseSnapshot], frame_rates: &dyn FrameRateSource) {
        let current_ids: Vec<&str> = snapshots.iter().map(|s| s.id.as_str()).collect();
        if self.cache.prune(&current_ids) {
            self.last_end_tick = self.cache.max_end_tick();
        }

        for snapshot in snapshots {
            if !snapshot.is_ready() {
                continue;
            }
            let Some(rate) = snapshot
                .engine
                .as_deref()
                .and_then(|e| frame_rates.frame_rate(e))
            else {
                continue;
            };
            if let Some(timeline) =
                self.cache
                    .upsert(snapshot, rate, self.profile.consonant_weight)
            {
                self.last_end_tick = self.last_end_tick.max(timeline.end_tick);
                self.last_tpqn = f64::from(timeline.tpqn.max(1));
            }
        }
    }

    /// Compute one frame.
    ///
    /// `playhead_ticks` may be non-finite; motion terms then fall back to
    /// phase 0 and the result stays finite. Calling this on a deactivated
    /// session is a precondition violation and fails fast.
    #[tracing::instrument(skip(self, snapshots, frame_rates), fields(ticks = playhead_ticks))]
    pub fn advance(
        &mut self,
        playhead_ticks: f64,
        enabled: bool,
        snapshots: &[PhraseSnapshot],
        frame_rates: &dyn FrameRateSource,
    ) -> CantomimeResult<FramePose> {
        if !self.active {
            return Err(CantomimeError::session(
                "advance called on a deactivated session",
            ));
        }

        self.sync_phrases(snapshots, frame_rates);

        if !enabled {
            return Ok(rest_pose());
        }

        let ticks_ok = playhead_ticks.is_finite();
        let ticks = if ticks_ok { playhead_ticks } else { 0.0 };
        let tpqn = self.last_tpqn.max(1.0);

        // 1. Repeating bar phase drives the idle sway.
        let bar = 4.0 * tpqn;
        let phase = ticks.rem_euclid(bar) / bar;
        let sway = self.sway_rotation(breathe_phase(phase));

        // 2. Past-content branch: decay, then rest.
        let past_tick = if ticks_ok {
            playhead_ticks - self.last_end_tick
        } else {
            0.0
        };
        let body = if past_tick > 0.0 {
            self.ending_rotation(past_tick, tpqn, sway)
        } else {
            self.ending = EndingState::NotEnded;
            let starting = ticks / tpqn;
            if starting < 1.0 {
                // Anticipation before the first quarter note: ease from the
                // lean-back rest rotation into the running sway.
                let k = Ease::CosineInOut.apply(starting.clamp(0.0, 1.0));
                self.anticipation_rotation().lerp(sway, k)
            } else {
                sway
            }
        };

        let mut pose = FramePose::new();
        pose.set_bone(bones::SPINE, body);
        pose.set_bone(bones::CHEST, body.scale(0.5));
        pose.set_bone(bones::NECK, Vec3::ZERO);
        pose.set_bone(bones::HEAD, Vec3::ZERO);
        for shape in [
            MouthShape::Aa,
            MouthShape::Ih,
            MouthShape::Ou,
            MouthShape::Ee,
            MouthShape::Oh,
        ] {
            pose.set_expression(shape.as_str(), 0.0);
        }
        pose.set_expression(reactions::LONG_NOTE, 0.0);
        pose.set_expression(reactions::FINALE, 0.0);

        // 3. Mouth shape from the active segment; once ended the mouth stays
        // closed no matter what the lookup would say.
        let segment = if self.ending == EndingState::Ended {
            Segment::silence_at(ticks)
        } else {
            self.cache.active_segment(playhead_ticks)
        };
        pose.set_expression(segment.shape.as_str(), segment.weight);

        // 4. Reaction gestures layered on top.
        self.apply_reactions(&mut pose, &segment, past_tick, tpqn, ticks_ok);

        // 5. Never leave the face blank.
        if pose.all_expressions_zero() {
            pose.set_expression(reactions::NEUTRAL, 1.0);
        }

        debug_assert!(pose.is_finite());
        Ok(pose)
    }

    fn sway_rotation(&self, breathe: f64) -> Vec3 {
        let amp = self.profile.sway_amplitude;
        Vec3::new(amp * breathe, 0.0, amp * 0.25 * breathe)
    }

    fn anticipation_rotation(&self) -> Vec3 {
        Vec3::new(-self.profile.anticipation_amplitude, 0.0, 0.0)
    }

    fn ending_rotation(&mut self, past_tick: f64, tpqn: f64, sway: Vec3) -> Vec3 {
        if past_tick >= tpqn {
            self.ending = EndingState::Ended;
            return Vec3::ZERO;
        }
        let from = match self.ending {
            EndingState::Decaying { from } => from,
            EndingState::Ended => return Vec3::ZERO,
            EndingState::NotEnded => {
                self.ending = EndingState::Decaying { from: sway };
                sway
            }
        };
        let t = (past_tick / tpqn).min(1.0);
        from.scale(1.0 - Ease::CosineInOut.apply(t))
    }

    fn apply_reactions(
        &self,
        pose: &mut FramePose,
        segment: &Segment,
        past_tick: f64,
        tpqn: f64,
        ticks_ok: bool,
    ) {
        let non_silent = segment.shape != MouthShape::Silence && segment.weight > 0.0;
        let duration = segment.tick_length();

        let mut long_note = 0.0;
        if self.profile.enable_long_note
            && non_silent
            && duration > tpqn * self.profile.long_note_ratio
        {
            long_note = 1.0;
        }
        if self.profile.enable_high_note
            && non_silent
            && duration > tpqn * self.profile.high_note_ratio
            && segment
                .note_number
                .is_some_and(|n| n > self.profile.high_note_threshold)
        {
            long_note = 1.0;
        }
        pose.set_expression(reactions::LONG_NOTE, long_note);

        if self.profile.enable_finale && ticks_ok && past_tick > 3.0 * tpqn {
            let ramp = ((past_tick - 3.0 * tpqn) / self.profile.finale_ramp_ticks).clamp(0.0, 1.0);
            pose.set_expression(reactions::FINALE, ramp);
            pose.add_bone(
                bones::HEAD,
                Vec3::new(0.0, 0.0, self.profile.finale_head_tilt * ramp),
            );
        }
    }
}

/// Motionless pose with the neutral expression raised, used while the
/// animation is disabled.
fn rest_pose() -> FramePose {
    let mut pose = FramePose::new();
    pose.set_bone(bones::SPINE, Vec3::ZERO);
    pose.set_bone(bones::CHEST, Vec3::ZERO);
    pose.set_bone(bones::NECK, Vec3::ZERO);
    pose.set_bone(bones::HEAD, Vec3::ZERO);
    pose.set_expression(reactions::NEUTRAL, 1.0);
    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::Phoneme;
    use crate::phrase::{FixedFrameRate, PhraseQuery};
    use crate::tempo::Tempo;

    const FPS: FixedFrameRate = FixedFrameRate(25.0);

    fn phrase(id: &str, start_time: f64, phonemes: &[(&str, u64)]) -> PhraseSnapshot {
        PhraseSnapshot {
            id: id.to_string(),
            engine: Some("e".to_string()),
            query: Some(PhraseQuery {
                phonemes: phonemes
                    .iter()
                    .map(|(s, n)| Phoneme::new(*s, *n))
                    .collect(),
                f0: None,
            }),
            start_time: Some(start_time),
            tempos: vec![Tempo {
                position: 0.0,
                bpm: 120.0,
            }],
            tpqn: 480,
        }
    }

    fn session() -> AnimationSession {
        AnimationSession::new(AvatarProfile::default()).unwrap()
    }

    #[test]
    fn advance_on_deactivated_session_is_fatal() {
        let mut s = session();
        s.deactivate();
        assert!(matches!(
            s.advance(0.0, true, &[], &FPS),
            Err(CantomimeError::Session(_))
        ));
    }

    #[test]
    fn deactivate_clears_all_state() {
        let mut s = session();
        // One second of "a" at 120 BPM / tpqn 480 ends at tick 960.
        s.advance(0.0, true, &[phrase("p0", 0.0, &[("a", 25)])], &FPS)
            .unwrap();
        assert_eq!(s.timelines().len(), 1);
        assert!((s.last_end_tick() - 960.0).abs() < 1e-6);

        s.deactivate();
        assert!(s.timelines().is_empty());
        assert_eq!(s.last_end_tick(), 0.0);

        s.activate();
        let pose = s.advance(0.0, true, &[], &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::NEUTRAL], 1.0);
    }

    #[test]
    fn vowel_segment_raises_its_mouth_shape() {
        let mut s = session();
        let pose = s
            .advance(100.0, true, &[phrase("p0", 0.0, &[("a", 25)])], &FPS)
            .unwrap();
        assert_eq!(pose.expressions["aa"], 1.0);
        assert_eq!(pose.expressions["ih"], 0.0);
    }

    #[test]
    fn disabled_frames_return_rest_but_keep_cache_warm() {
        let mut s = session();
        let pose = s
            .advance(100.0, false, &[phrase("p0", 0.0, &[("a", 25)])], &FPS)
            .unwrap();
        assert_eq!(pose.expressions[reactions::NEUTRAL], 1.0);
        assert_eq!(pose.bones[bones::SPINE], Vec3::ZERO);
        // The phrase was still cached during the disabled frame.
        assert_eq!(s.timelines().len(), 1);
    }

    #[test]
    fn removing_last_phrase_resets_end_tick() {
        let mut s = session();
        s.advance(0.0, true, &[phrase("p0", 0.0, &[("a", 25)])], &FPS)
            .unwrap();
        assert!(s.last_end_tick() > 0.0);
        s.advance(0.0, true, &[], &FPS).unwrap();
        assert_eq!(s.last_end_tick(), 0.0);
    }

    #[test]
    fn ending_decay_is_monotone_and_reaches_rest() {
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 25)])];
        // Build the timeline; phrase ends at tick 960, tpqn 480.
        s.advance(0.0, true, &snaps, &FPS).unwrap();
        let end = s.last_end_tick();
        let tpqn = s.last_tpqn();

        let mut prev = f64::INFINITY;
        for i in 1..=20 {
            let past = tpqn * (i as f64) / 20.0;
            let pose = s.advance(end + past, true, &snaps, &FPS).unwrap();
            let mag = pose.bones[bones::SPINE].max_abs();
            assert!(mag <= prev + 1e-12, "decay grew at past={past}");
            prev = mag;
        }
        // Exactly rest at one quarter note past the end.
        let pose = s.advance(end + tpqn, true, &snaps, &FPS).unwrap();
        assert_eq!(pose.bones[bones::SPINE], Vec3::ZERO);
        // Ended: mouth closed regardless of lookup.
        assert_eq!(pose.expressions[reactions::NEUTRAL], 1.0);
        assert_eq!(pose.expressions["aa"], 0.0);
    }

    #[test]
    fn returning_into_content_clears_the_ended_state() {
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 25)])];
        s.advance(0.0, true, &snaps, &FPS).unwrap();
        let end = s.last_end_tick();

        // Walk past the end so the session settles into Ended...
        s.advance(end + s.last_tpqn() * 2.0, true, &snaps, &FPS).unwrap();
        // ...then seek back inside the phrase: the vowel is live again.
        let pose = s.advance(end / 2.0, true, &snaps, &FPS).unwrap();
        assert_eq!(pose.expressions["aa"], 1.0);
    }

    #[test]
    fn long_note_gate_requires_duration_and_voicing() {
        let mut s = session();
        // 100 frames of "a" = 4 s = 3840 ticks, way past 2*tpqn.
        let long = [phrase("p0", 0.0, &[("a", 100)])];
        let pose = s.advance(10.0, true, &long, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::LONG_NOTE], 1.0);

        // A short vowel never trips the gate.
        let mut s = session();
        let short = [phrase("p0", 0.0, &[("a", 10)])];
        let pose = s.advance(10.0, true, &short, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::LONG_NOTE], 0.0);

        // A long pause is not a long note.
        let mut s = session();
        let pause = [phrase("p0", 0.0, &[("pau", 100), ("a", 10)])];
        let pose = s.advance(10.0, true, &pause, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::LONG_NOTE], 0.0);
    }

    #[test]
    fn high_note_gate_needs_pitch_above_threshold() {
        let mut profile = AvatarProfile::default();
        profile.enable_long_note = false;
        profile.enable_high_note = true;
        profile.high_note_ratio = 1.0;
        profile.high_note_threshold = 70.0;

        // 50 frames = 1920 ticks > tpqn; f0 880 Hz = note 81.
        let mut snap = phrase("p0", 0.0, &[("a", 50)]);
        snap.query.as_mut().unwrap().f0 = Some(vec![880.0; 50]);

        let mut s = AnimationSession::new(profile.clone()).unwrap();
        let pose = s.advance(10.0, true, &[snap.clone()], &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::LONG_NOTE], 1.0);

        // Below threshold: 220 Hz = note 57.
        snap.id = "p1".to_string();
        snap.query.as_mut().unwrap().f0 = Some(vec![220.0; 50]);
        let mut s = AnimationSession::new(profile).unwrap();
        let pose = s.advance(10.0, true, &[snap], &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::LONG_NOTE], 0.0);
    }

    #[test]
    fn finale_ramps_in_after_three_quarter_notes() {
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 25)])];
        s.advance(0.0, true, &snaps, &FPS).unwrap();
        let end = s.last_end_tick();
        let tpqn = s.last_tpqn();

        let pose = s.advance(end + 3.0 * tpqn - 1.0, true, &snaps, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::FINALE], 0.0);

        let pose = s.advance(end + 3.0 * tpqn + 12.0, true, &snaps, &FPS).unwrap();
        assert!((pose.expressions[reactions::FINALE] - 0.5).abs() < 1e-9);
        assert!(pose.bones[bones::HEAD].z > 0.0);

        let pose = s.advance(end + 3.0 * tpqn + 24.0, true, &snaps, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::FINALE], 1.0);
    }

    #[test]
    fn nan_playhead_never_produces_nan_output() {
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 25)])];
        let pose = s.advance(f64::NAN, true, &snaps, &FPS).unwrap();
        assert!(pose.is_finite());
        // The face is not blank either.
        assert!(!pose.all_expressions_zero());
    }

    #[test]
    fn zero_consonant_weight_falls_back_to_neutral() {
        let mut profile = AvatarProfile::default();
        profile.consonant_weight = 0.0;
        let mut s = AnimationSession::new(profile).unwrap();
        // A lone consonant maps to weight 0; the neutral fallback covers it.
        let snaps = [phrase("p0", 0.0, &[("z", 25)])];
        let pose = s.advance(100.0, true, &snaps, &FPS).unwrap();
        assert_eq!(pose.expressions[reactions::NEUTRAL], 1.0);
    }

    #[test]
    fn starting_anticipation_before_first_quarter_note() {
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 100)])];
        let pose = s.advance(0.0, true, &snaps, &FPS).unwrap();
        // At tick 0 the eased blend sits fully on the lean-back rotation.
        let spine = pose.bones[bones::SPINE];
        assert!(spine.x < 0.0);
        assert!(pose.is_finite());
    }

    #[test]
    fn phrase_without_frame_rate_is_skipped_for_the_frame() {
        struct NoRates;
        impl FrameRateSource for NoRates {
            fn frame_rate(&self, _engine_id: &str) -> Option<f64> {
                None
            }
        }
        let mut s = session();
        let snaps = [phrase("p0", 0.0, &[("a", 25)])];
        s.advance(0.0, true, &snaps, &NoRates).unwrap();
        assert!(s.timelines().is_empty());
        // The same phrase builds fine once the rate is known.
        s.advance(0.0, true, &snaps, &FPS).unwrap();
        assert_eq!(s.timelines().len(), 1);
    }
}
