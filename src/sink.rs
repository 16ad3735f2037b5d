//! Outbound pose telemetry.
//!
//! Shipping computed poses to a remote consumer is fire-and-forget: a frame
//! either gets out or it doesn't. Nothing here blocks, retries, or surfaces
//! an error into the render loop.

use std::sync::mpsc::{SyncSender, TrySendError};

use crate::pose::FramePose;

pub trait PoseSink {
    /// Offer one frame's pose. Returns whether it was accepted; a refused
    /// frame is simply dropped.
    fn offer(&mut self, pose: &FramePose) -> bool;
}

/// Sink collecting poses in memory, for tests and local consumers.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub frames: Vec<FramePose>,
}

impl PoseSink for BufferSink {
    fn offer(&mut self, pose: &FramePose) -> bool {
        self.frames.push(pose.clone());
        true
    }
}

/// Sink pushing JSON-encoded poses into a bounded channel.
///
/// A full or disconnected channel drops the frame; the next frame is offered
/// fresh.
#[derive(Debug)]
pub struct ChannelSink {
    tx: SyncSender<String>,
}

impl ChannelSink {
    pub fn new(tx: SyncSender<String>) -> Self {
        Self { tx }
    }
}

impl PoseSink for ChannelSink {
    fn offer(&mut self, pose: &FramePose) -> bool {
        let Ok(payload) = serde_json::to_string(pose) else {
            return false;
        };
        match self.tx.try_send(payload) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("pose channel unready, frame dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;

    #[test]
    fn channel_sink_ships_json_frames() {
        let (tx, rx) = sync_channel(4);
        let mut sink = ChannelSink::new(tx);
        assert!(sink.offer(&FramePose::new()));
        let payload = rx.recv().unwrap();
        let decoded: FramePose = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, FramePose::new());
    }

    #[test]
    fn full_channel_drops_without_blocking() {
        let (tx, _rx) = sync_channel(1);
        let mut sink = ChannelSink::new(tx);
        assert!(sink.offer(&FramePose::new()));
        // Capacity exhausted: the second frame is dropped, not queued.
        assert!(!sink.offer(&FramePose::new()));
    }

    #[test]
    fn disconnected_channel_drops_without_erroring() {
        let (tx, rx) = sync_channel(1);
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        assert!(!sink.offer(&FramePose::new()));
        // Subsequent offers stay quiet too.
        assert!(!sink.offer(&FramePose::new()));
    }
}
