//! Ingestion Pipeline main entry

use std::sync::Arc;

use async_channel::{bounded, unbounded, Receiver, Sender};
use contracts::{FrameSource, SensorEvent, SpeechSource};
use tracing::{debug, info, instrument};

use crate::adapter::{SourceAdapter, StreamKind};
use crate::adapters::{FrameAdapter, SpeechAdapter};
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};
use crate::receiver::EventReceiver;

/// Ingestion Pipeline
///
/// Merges frame and speech sources into one event stream. Frames share a
/// bounded lane governed by the drop policy; speech has an unbounded lane of
/// its own. Frame sources are always started before speech sources.
pub struct IngestionPipeline {
    /// Registered adapters, in registration order
    adapters: Vec<Box<dyn SourceAdapter>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Bounded frame lane (shared by all frame adapters)
    frame_tx: Sender<SensorEvent>,

    /// Receiver clone used to evict the oldest frame event
    frame_drain: Receiver<SensorEvent>,

    /// Unbounded speech lane
    speech_tx: Sender<SensorEvent>,
    speech_drain: Receiver<SensorEvent>,

    /// Event receiver
    rx: Option<EventReceiver>,

    config: BackpressureConfig,
}

impl IngestionPipeline {
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (frame_tx, frame_rx) = bounded(config.channel_capacity.max(1));
        let (speech_tx, speech_rx) = unbounded();

        Self {
            adapters: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            frame_tx,
            frame_drain: frame_rx.clone(),
            speech_tx,
            speech_drain: speech_rx.clone(),
            rx: Some(EventReceiver::new(frame_rx, speech_rx)),
            config,
        }
    }

    /// Register a color + skeleton frame source
    #[instrument(
        name = "ingestion_register_frame_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_frame_source(&mut self, source: Arc<dyn FrameSource>) -> Result<()> {
        self.ensure_unique(source.source_id())?;
        let adapter = FrameAdapter::new(source, self.config.clone());
        debug!(source_id = %adapter.source_id(), "registered frame source");
        self.adapters.push(Box::new(adapter));
        Ok(())
    }

    /// Register a speech recognition source
    #[instrument(
        name = "ingestion_register_speech_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_speech_source(&mut self, source: Arc<dyn SpeechSource>) -> Result<()> {
        self.ensure_unique(source.source_id())?;
        let adapter = SpeechAdapter::new(source, self.config.clone());
        debug!(source_id = %adapter.source_id(), "registered speech source");
        self.adapters.push(Box::new(adapter));
        Ok(())
    }

    fn ensure_unique(&self, source_id: &str) -> Result<()> {
        if self.adapters.iter().any(|a| a.source_id() == source_id) {
            return Err(IngestionError::DuplicateSource {
                source_id: source_id.to_string(),
            });
        }
        Ok(())
    }

    /// Start all registered sources, frame sources first
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) -> Result<()> {
        if self.source_count(StreamKind::Frames) == 0 {
            return Err(IngestionError::NoFrameSource);
        }

        info!(count = self.adapters.len(), "starting all sources");
        for kind in [StreamKind::Frames, StreamKind::Speech] {
            for adapter in self.adapters.iter().filter(|a| a.kind() == kind) {
                self.start_adapter(adapter.as_ref());
            }
        }
        Ok(())
    }

    /// Stop all sources, speech first
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all sources");
        for kind in [StreamKind::Speech, StreamKind::Frames] {
            for adapter in self.adapters.iter().filter(|a| a.kind() == kind) {
                self.stop_adapter(adapter.as_ref());
            }
        }
    }

    fn start_adapter(&self, adapter: &dyn SourceAdapter) {
        if !adapter.is_listening() {
            debug!(
                source_id = %adapter.source_id(),
                kind = adapter.kind().as_str(),
                "starting adapter"
            );
            let (tx, drain) = match adapter.kind() {
                StreamKind::Frames => (&self.frame_tx, &self.frame_drain),
                StreamKind::Speech => (&self.speech_tx, &self.speech_drain),
            };
            adapter.start(tx.clone(), drain.clone(), self.metrics.clone());
        }
    }

    fn stop_adapter(&self, adapter: &dyn SourceAdapter) {
        if adapter.is_listening() {
            debug!(
                source_id = %adapter.source_id(),
                kind = adapter.kind().as_str(),
                "stopping adapter"
            );
            adapter.stop();
        }
    }

    /// Get event stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<EventReceiver> {
        self.rx.take()
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    pub fn source_count(&self, kind: StreamKind) -> usize {
        self.adapters.iter().filter(|a| a.kind() == kind).count()
    }

    pub fn is_source_listening(&self, source_id: &str) -> bool {
        self.adapters
            .iter()
            .find(|a| a.source_id() == source_id)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
