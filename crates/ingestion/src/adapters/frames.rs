//! 帧源适配器
//!
//! 将 `FrameSource` 回调中的 `AllFramesReady` 封装为 `SensorEvent::Frames`。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use contracts::{FrameCallback, FrameSource, SensorEvent};
use tracing::{debug, trace};

use crate::adapter::{SourceAdapter, StreamKind};
use crate::adapters::common::send_event;
use crate::config::{BackpressureConfig, IngestionMetrics};

/// 帧源适配器
pub struct FrameAdapter {
    source: Arc<dyn FrameSource>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl FrameAdapter {
    pub fn new(source: Arc<dyn FrameSource>, config: BackpressureConfig) -> Self {
        Self {
            source,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SourceAdapter for FrameAdapter {
    fn source_id(&self) -> &str {
        self.source.source_id()
    }

    fn kind(&self) -> StreamKind {
        StreamKind::Frames
    }

    fn start(
        &self,
        tx: Sender<SensorEvent>,
        drain: Receiver<SensorEvent>,
        metrics: Arc<IngestionMetrics>,
    ) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source.source_id().to_string();
        let drop_policy = self.config.drop_policy;
        let listening = self.listening.clone();

        debug!(source_id = %source_id, "starting frame adapter");

        let callback: FrameCallback = Arc::new(move |frames| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_frames();
            metrics::counter!("lightsaber_ingestion_events_total", "kind" => "frames")
                .increment(1);
            trace!(
                source_id = %source_id,
                timestamp = frames.timestamp,
                has_color = frames.color.is_some(),
                has_skeleton = frames.skeleton.is_some(),
                "frames ready"
            );
            let _ = send_event(
                &tx,
                &drain,
                SensorEvent::Frames(frames),
                &metrics,
                &source_id,
                drop_policy,
            );
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.source.source_id(), "stopping frame adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
