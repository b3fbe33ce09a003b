//! Consumer side of the ingestion lanes

use async_channel::{Receiver, RecvError, TryRecvError};
use contracts::SensorEvent;

/// Merged view over the frame lane and the speech lane
///
/// Frames travel through the bounded lane and obey the drop policy. Speech
/// results travel through their own unbounded lane, so a frame burst can
/// never evict a voice command. Queued speech is handed out first.
#[derive(Debug, Clone)]
pub struct EventReceiver {
    frames: Receiver<SensorEvent>,
    speech: Receiver<SensorEvent>,
}

impl EventReceiver {
    pub(crate) fn new(frames: Receiver<SensorEvent>, speech: Receiver<SensorEvent>) -> Self {
        Self { frames, speech }
    }

    /// Wait for the next event
    ///
    /// Fails once the frame lane is closed and no speech is pending.
    /// Cancel safe: a dropped call never loses an event.
    pub async fn recv(&self) -> Result<SensorEvent, RecvError> {
        if let Ok(event) = self.speech.try_recv() {
            return Ok(event);
        }

        tokio::select! {
            biased;
            Ok(event) = self.speech.recv() => Ok(event),
            event = self.frames.recv() => event,
        }
    }

    pub fn try_recv(&self) -> Result<SensorEvent, TryRecvError> {
        self.speech
            .try_recv()
            .or_else(|_| self.frames.try_recv())
    }

    /// Events waiting in both lanes
    pub fn len(&self) -> usize {
        self.frames.len() + self.speech.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.speech.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::{bounded, unbounded};
    use contracts::{AllFramesReady, SpeechResult};

    fn frames(timestamp: f64) -> SensorEvent {
        SensorEvent::Frames(AllFramesReady {
            timestamp,
            ..Default::default()
        })
    }

    fn hulk() -> SensorEvent {
        SensorEvent::Speech(SpeechResult {
            text: "hulk".into(),
            confidence: 0.9,
            timestamp: 0.5,
        })
    }

    #[tokio::test]
    async fn speech_jumps_queued_frames() {
        let (frame_tx, frame_rx) = bounded(4);
        let (speech_tx, speech_rx) = unbounded();
        let receiver = EventReceiver::new(frame_rx, speech_rx);

        frame_tx.try_send(frames(0.0)).unwrap();
        frame_tx.try_send(frames(1.0)).unwrap();
        speech_tx.try_send(hulk()).unwrap();
        assert_eq!(receiver.len(), 3);

        let kinds: Vec<&str> = [
            receiver.recv().await.unwrap(),
            receiver.recv().await.unwrap(),
            receiver.try_recv().unwrap(),
        ]
        .iter()
        .map(SensorEvent::kind)
        .collect();
        assert_eq!(kinds, vec!["speech", "frames", "frames"]);
        assert!(receiver.is_empty());
    }

    #[tokio::test]
    async fn closed_frame_lane_ends_the_stream() {
        let (frame_tx, frame_rx) = bounded::<SensorEvent>(1);
        let (_speech_tx, speech_rx) = unbounded();
        let receiver = EventReceiver::new(frame_rx, speech_rx);

        drop(frame_tx);
        assert!(receiver.recv().await.is_err());
    }
}
