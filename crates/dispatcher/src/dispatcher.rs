//! Dispatcher - main loop for fan-out to sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{AudioConfig, DuelUpdate, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{AudioSink, FileSink, LogSink, LoggingPlayer};

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub sinks: Vec<SinkConfig>,

    /// Sound assets used by audio sinks
    pub audio: AudioConfig,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<DuelUpdate>,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<DuelUpdate>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = self
            .config
            .sinks
            .iter()
            .map(|sink_config| create_sink_handle(sink_config, &self.config.audio))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, audio),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(
    config: &SinkConfig,
    audio: &AudioConfig,
) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Audio => {
            let sink = AudioSink::from_params(
                &config.name,
                audio,
                &config.params,
                LoggingPlayer::default(),
            );
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans duel updates out to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<DuelUpdate>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<DuelUpdate>) -> Self {
        Self { handles, input_rx }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.handles.iter().map(SinkHandle::name).collect()
    }

    /// Metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Returns the final sink metrics once the input channel is closed and
    /// every sink drained its queue.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) -> Vec<(String, MetricsSnapshot)> {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut update_count: u64 = 0;

        while let Some(update) = self.input_rx.recv().await {
            update_count += 1;
            self.dispatch(&update);

            if update_count.is_multiple_of(300) {
                debug!(updates = update_count, "Dispatcher progress");
            }
        }

        info!(updates = update_count, "Dispatcher input closed, shutting down");

        let mut metrics = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let sink_metrics = Arc::clone(handle.metrics());
            handle.shutdown().await;
            // snapshot after the queue drained
            metrics.push((sink_metrics.sink().to_string(), sink_metrics.snapshot()));
        }
        info!("Dispatcher shutdown complete");

        metrics
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<Vec<(String, MetricsSnapshot)>> {
        tokio::spawn(self.run())
    }

    fn dispatch(&self, update: &DuelUpdate) {
        for handle in &self.handles {
            // drops are counted and logged by the handle
            let _ = handle.try_send(update.clone());
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip_all)]
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    audio: AudioConfig,
    input_rx: mpsc::Receiver<DuelUpdate>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
        audio,
    };
    DispatcherBuilder::new(config, input_rx).build()
}
