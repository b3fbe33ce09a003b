//! # Dispatcher
//!
//! 对战输出分发模块。
//!
//! 负责：
//! - 消费 `DuelUpdate`
//! - Fan-out 到多个 sinks (日志 / JSONL 文件 / 音效)
//! - 隔离慢 sink，不阻塞对战主循环

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, DuelUpdate};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::{DispatcherError, PlaybackError};
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{AudioSink, FileSink, FileSinkConfig, LogSink, LoggingPlayer, SoundPlayer};

#[cfg(test)]
pub(crate) mod test_support {
    use contracts::{DuelMeta, DuelScene, DuelUpdate, GameStateSnapshot};

    /// Empty update with the given id
    pub fn update(update_id: u64) -> DuelUpdate {
        DuelUpdate {
            update_id,
            timestamp: update_id as f64 / 30.0,
            image: None,
            scene: DuelScene::default(),
            sounds: Vec::new(),
            events: Vec::new(),
            changes: Vec::new(),
            state: GameStateSnapshot::default(),
            meta: DuelMeta::default(),
        }
    }
}
