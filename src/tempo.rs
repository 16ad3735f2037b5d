//! Musical time conversion between seconds and ticks.
//!
//! Conversions walk the tempo list segment by segment; within one tempo
//! segment time and ticks are proportional, so both directions are exact and
//! monotonic.

/// One tempo change, positioned on the tick axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tempo {
    /// Tick position at which this tempo takes effect.
    pub position: f64,
    /// Beats (quarter notes) per minute from `position` onward.
    pub bpm: f64,
}

/// Tempo assumed before the first entry of a tempo list (or for an empty one).
pub const DEFAULT_BPM: f64 = 120.0;

const MIN_BPM: f64 = 1e-6;

fn seconds_per_tick(bpm: f64, tpqn: f64) -> f64 {
    60.0 / (bpm.max(MIN_BPM) * tpqn)
}

/// Convert an absolute time in seconds to a tick position.
///
/// Non-finite or negative input maps to tick 0.
pub fn seconds_to_tick(seconds: f64, tempos: &[Tempo], tpqn: u32) -> f64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0.0;
    }
    let tpqn = f64::from(tpqn.max(1));

    let mut elapsed = 0.0;
    let mut pos = 0.0;
    let mut bpm = DEFAULT_BPM;
    for tempo in tempos {
        let next_pos = tempo.position.max(pos);
        let span_secs = (next_pos - pos) * seconds_per_tick(bpm, tpqn);
        if elapsed + span_secs > seconds {
            break;
        }
        elapsed += span_secs;
        pos = next_pos;
        bpm = tempo.bpm;
    }
    pos + (seconds - elapsed) / seconds_per_tick(bpm, tpqn)
}

/// Convert a tick position to an absolute time in seconds.
///
/// Non-finite or negative input maps to 0 seconds.
pub fn tick_to_seconds(ticks: f64, tempos: &[Tempo], tpqn: u32) -> f64 {
    if !ticks.is_finite() || ticks <= 0.0 {
        return 0.0;
    }
    let tpqn = f64::from(tpqn.max(1));

    let mut elapsed = 0.0;
    let mut pos = 0.0;
    let mut bpm = DEFAULT_BPM;
    for tempo in tempos {
        let next_pos = tempo.position.max(pos);
        if next_pos > ticks {
            break;
        }
        elapsed += (next_pos - pos) * seconds_per_tick(bpm, tpqn);
        pos = next_pos;
        bpm = tempo.bpm;
    }
    elapsed + (ticks - pos) * seconds_per_tick(bpm, tpqn)
}

/// Convert a fundamental frequency in Hz to a MIDI note number.
///
/// Returns `None` for non-positive or non-finite frequencies (unvoiced
/// frames in an f0 array are reported as 0).
pub fn frequency_to_note_number(hz: f64) -> Option<f64> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    Some(69.0 + 12.0 * (hz / 440.0).log2())
}
