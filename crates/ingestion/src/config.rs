//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::IngestionConfig;
pub use contracts::DropPolicy;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Channel capacity
    pub channel_capacity: usize,

    /// Drop policy when full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl BackpressureConfig {
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
            drop_policy,
        }
    }
}

impl From<&IngestionConfig> for BackpressureConfig {
    fn from(config: &IngestionConfig) -> Self {
        Self::new(config.channel_capacity, config.drop_policy)
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Frame bundles received from frame sources
    pub frames_received: AtomicU64,

    /// Recognition results received from speech sources
    pub speech_received: AtomicU64,

    /// Events discarded by the drop policy
    pub events_dropped: AtomicU64,

    /// Queue length observed at the last send
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frames(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_speech(&self) {
        self.speech_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            speech_received: self.speech_received.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub speech_received: u64,
    pub events_dropped: u64,
    pub queue_len: usize,
}

impl MetricsSnapshot {
    pub fn events_received(&self) -> u64 {
        self.frames_received + self.speech_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_never_zero() {
        let config = BackpressureConfig::new(0, DropPolicy::DropNewest);
        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn from_ingestion_section() {
        let section = IngestionConfig {
            channel_capacity: 8,
            drop_policy: DropPolicy::DropNewest,
        };
        let config = BackpressureConfig::from(&section);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.drop_policy, DropPolicy::DropNewest);
    }

    #[test]
    fn snapshot_totals() {
        let metrics = IngestionMetrics::new();
        metrics.record_frames();
        metrics.record_frames();
        metrics.record_speech();
        metrics.record_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_received(), 3);
        assert_eq!(snapshot.events_dropped, 1);
    }
}
