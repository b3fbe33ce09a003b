//! Per-sink metrics
//!
//! Local atomics for the end-of-run summary, mirrored to the `metrics`
//! facade with a `sink` label for the Prometheus exporter.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use metrics::{counter, gauge};

/// Metrics for a single sink
#[derive(Debug)]
pub struct SinkMetrics {
    sink: String,
    queue_len: AtomicUsize,
    writes: AtomicU64,
    failures: AtomicU64,
    dropped: AtomicU64,
    /// Highest update id written
    last_update_id: AtomicU64,
}

impl SinkMetrics {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            queue_len: AtomicUsize::new(0),
            writes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            last_update_id: AtomicU64::new(0),
        }
    }

    pub fn sink(&self) -> &str {
        &self.sink
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
        gauge!("lightsaber_sink_queue_len", "sink" => self.sink.clone()).set(len as f64);
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn record_write(&self, update_id: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.last_update_id.fetch_max(update_id, Ordering::Relaxed);
        counter!("lightsaber_sink_writes_total", "sink" => self.sink.clone()).increment(1);
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        counter!("lightsaber_sink_failures_total", "sink" => self.sink.clone()).increment(1);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        counter!("lightsaber_sink_dropped_total", "sink" => self.sink.clone()).increment(1);
    }

    pub fn last_update_id(&self) -> u64 {
        self.last_update_id.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
            last_update_id: self.last_update_id(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
    pub last_update_id: u64,
}

impl MetricsSnapshot {
    /// Updates that reached the sink, written or failed
    pub fn delivered(&self) -> u64 {
        self.write_count + self.failure_count
    }
}
