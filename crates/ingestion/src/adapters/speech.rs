//! 语音源适配器
//!
//! 将 `SpeechSource` 识别结果封装为 `SensorEvent::Speech`。
//! 置信度过滤由引擎负责，这里原样转发。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use contracts::{SensorEvent, SpeechCallback, SpeechSource};
use tracing::{debug, trace};

use crate::adapter::{SourceAdapter, StreamKind};
use crate::adapters::common::send_event;
use crate::config::{BackpressureConfig, IngestionMetrics};

/// 语音源适配器
pub struct SpeechAdapter {
    source: Arc<dyn SpeechSource>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl SpeechAdapter {
    pub fn new(source: Arc<dyn SpeechSource>, config: BackpressureConfig) -> Self {
        Self {
            source,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SourceAdapter for SpeechAdapter {
    fn source_id(&self) -> &str {
        self.source.source_id()
    }

    fn kind(&self) -> StreamKind {
        StreamKind::Speech
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

        debug!(
            source_id = %source_id,
            recognizer = %self.source.recognizer().id,
            "starting speech adapter"
        );

        let callback: SpeechCallback = Arc::new(move |result| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_speech();
            metrics::counter!("lightsaber_ingestion_events_total", "kind" => "speech")
                .increment(1);
            trace!(
                source_id = %source_id,
                text = %result.text,
                confidence = result.confidence,
                "speech recognized"
            );
            let _ = send_event(
                &tx,
                &drain,
                SensorEvent::Speech(result),
                &metrics,
                &source_id,
                drop_policy,
            );
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.source.source_id(), "stopping speech adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
