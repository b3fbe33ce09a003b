//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DataSink, DuelUpdate};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<DuelUpdate>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: DataSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new(&name));

        let worker_metrics = Arc::clone(&metrics);
        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue an update without waiting
    ///
    /// A full queue drops the update; the engine never blocks on a sink.
    pub fn try_send(&self, update: DuelUpdate) -> Result<(), DispatcherError> {
        match self.tx.try_send(update) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(update)) => {
                self.metrics.record_drop();
                warn!(sink = %self.name, update_id = update.update_id, "Queue full, update dropped");
                Err(DispatcherError::QueueFull {
                    sink_name: self.name.clone(),
                    update_id: update.update_id,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                Err(DispatcherError::WorkerClosed {
                    sink_name: self.name.clone(),
                })
            }
        }
    }

    /// Close the queue and wait until the worker drained it
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(name = "sink_worker_loop", skip_all, fields(sink = %metrics.sink()))]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<DuelUpdate>,
    metrics: Arc<SinkMetrics>,
) {
    debug!("Sink worker started");

    while let Some(update) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&update).await {
            Ok(()) => metrics.record_write(update.update_id),
            Err(e) => {
                // a failed write never stops the worker
                metrics.record_failure();
                error!(update_id = update.update_id, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(error = %e, "Close failed on shutdown");
    }

    debug!("Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::update;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                write_count: Arc::new(AtomicU64::new(0)),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl DataSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _update: &DuelUpdate) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let sink = MockSink::new("test");
        let write_count = Arc::clone(&sink.write_count);
        let handle = SinkHandle::spawn(sink, 10);

        for i in 1..=5 {
            assert!(handle.try_send(update(i)).is_ok());
        }

        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.last_update_id(), 5);
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let sink = MockSink {
            delay_ms: 100,
            ..MockSink::new("slow")
        };
        let handle = SinkHandle::spawn(sink, 2);

        let results: Vec<_> = (1..=10).map(|i| handle.try_send(update(i))).collect();

        assert!(results.iter().any(|r| matches!(r, Err(e) if e.is_drop())));
        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let sink = MockSink {
            should_fail: true,
            ..MockSink::new("failing")
        };
        let handle = SinkHandle::spawn(sink, 10);

        for i in 1..=3 {
            let _ = handle.try_send(update(i));
        }
        sleep(Duration::from_millis(50)).await;

        assert_eq!(handle.metrics().failure_count(), 3);
        handle.shutdown().await;
    }
}
