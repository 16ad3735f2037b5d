//! Cantomime drives a 3D avatar's face and body in real time from a
//! singing-voice synthesis timeline.
//!
//! Given the playhead position in musical ticks and a snapshot of the
//! in-progress phrases, an [`AnimationSession`] computes one stable
//! [`FramePose`] per rendered frame: mouth-shape expression weights derived
//! from phoneme timing, idle body sway, and transient reaction gestures.
//! The session resynchronizes continuously as phrases appear and disappear,
//! with no pause in rendering.
#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod ease;
pub mod error;
pub mod expression;
pub mod phoneme;
pub mod phrase;
pub mod pose;
pub mod rig;
pub mod session;
pub mod sink;
pub mod tempo;
pub mod timeline;

pub use config::AvatarProfile;
pub use core::Vec3;
pub use error::{CantomimeError, CantomimeResult};
pub use expression::MouthShape;
pub use phoneme::Phoneme;
pub use phrase::{FixedFrameRate, FrameRateSource, PhraseQuery, PhraseSnapshot};
pub use pose::FramePose;
pub use rig::{RecordingRig, Rig};
pub use session::AnimationSession;
pub use sink::{BufferSink, ChannelSink, PoseSink};
pub use tempo::{Tempo, frequency_to_note_number, seconds_to_tick, tick_to_seconds};
pub use timeline::{PhraseTimeline, Segment, TimelineCache};
