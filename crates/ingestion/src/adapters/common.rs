//! Adapter common utility functions

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{DropPolicy, SensorEvent};
use tracing::{trace, warn};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Outcome of a non-blocking send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// Delivered after evicting the oldest queued event
    ReplacedOldest,
    /// The new event was discarded
    DroppedNewest,
}

/// Send event, handling backpressure policy
pub fn send_event(
    tx: &Sender<SensorEvent>,
    drain: &Receiver<SensorEvent>,
    event: SensorEvent,
    metrics: &IngestionMetrics,
    source_id: &str,
    drop_policy: DropPolicy,
) -> Result<SendOutcome> {
    let kind = event.kind();
    let outcome = match tx.try_send(event) {
        Ok(()) => {
            trace!(source_id = %source_id, kind, "event sent");
            SendOutcome::Delivered
        }
        Err(TrySendError::Full(event)) => {
            metrics.record_dropped();
            metrics::counter!(
                "lightsaber_ingestion_events_dropped_total",
                "kind" => kind,
                "policy" => policy_label(drop_policy)
            )
            .increment(1);

            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(source_id = %source_id, kind, "event dropped (newest)");
                    SendOutcome::DroppedNewest
                }
                DropPolicy::DropOldest => {
                    let evicted = drain.try_recv().ok();
                    trace!(
                        source_id = %source_id,
                        kind,
                        evicted = evicted.as_ref().map(SensorEvent::kind),
                        "event dropped (oldest)"
                    );
                    match tx.try_send(event) {
                        Ok(()) => SendOutcome::ReplacedOldest,
                        // another producer refilled the slot first
                        Err(TrySendError::Full(_)) => SendOutcome::DroppedNewest,
                        Err(TrySendError::Closed(_)) => {
                            return Err(IngestionError::ChannelClosed {
                                source_id: source_id.to_string(),
                            });
                        }
                    }
                }
            }
        }
        Err(TrySendError::Closed(_)) => {
            warn!(source_id = %source_id, "channel closed");
            return Err(IngestionError::ChannelClosed {
                source_id: source_id.to_string(),
            });
        }
    };

    // queue depth tracks the bounded frame lane
    if tx.capacity().is_some() {
        metrics.update_queue_len(tx.len());
    }
    Ok(outcome)
}

fn policy_label(policy: DropPolicy) -> &'static str {
    match policy {
        DropPolicy::DropOldest => "drop_oldest",
        DropPolicy::DropNewest => "drop_newest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::bounded;
    use contracts::{AllFramesReady, SpeechResult};

    fn frames(timestamp: f64) -> SensorEvent {
        SensorEvent::Frames(AllFramesReady {
            timestamp,
            ..Default::default()
        })
    }

    #[test]
    fn drop_oldest_keeps_latest_events() {
        let (tx, rx) = bounded(2);
        let metrics = IngestionMetrics::new();

        for t in [0.0, 1.0, 2.0] {
            send_event(&tx, &rx, frames(t), &metrics, "kinect", DropPolicy::DropOldest).unwrap();
        }

        let kept: Vec<f64> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| event.timestamp())
            .collect();
        assert_eq!(kept, vec![1.0, 2.0]);
        assert_eq!(metrics.snapshot().events_dropped, 1);
    }

    #[test]
    fn drop_newest_keeps_queued_events() {
        let (tx, rx) = bounded(1);
        let metrics = IngestionMetrics::new();

        let first = send_event(&tx, &rx, frames(0.0), &metrics, "kinect", DropPolicy::DropNewest);
        let second = send_event(
            &tx,
            &rx,
            SensorEvent::Speech(SpeechResult {
                text: "hulk".into(),
                confidence: 0.9,
                timestamp: 0.1,
            }),
            &metrics,
            "kinect_audio",
            DropPolicy::DropNewest,
        );

        assert_eq!(first.unwrap(), SendOutcome::Delivered);
        assert_eq!(second.unwrap(), SendOutcome::DroppedNewest);
        assert_eq!(rx.try_recv().unwrap().kind(), "frames");
    }

    #[test]
    fn closed_channel_is_an_error() {
        let (tx, rx) = bounded::<SensorEvent>(1);
        rx.close();
        let metrics = IngestionMetrics::new();
        let result = send_event(&tx, &rx, frames(0.0), &metrics, "kinect", DropPolicy::DropOldest);
        assert!(matches!(result, Err(IngestionError::ChannelClosed { .. })));
    }
}
