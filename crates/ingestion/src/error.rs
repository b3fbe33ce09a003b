//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 同一 ID 的源重复注册
    #[error("source {source_id} is already registered")]
    DuplicateSource {
        /// 源 ID
        source_id: String,
    },

    /// 启动时没有任何帧源
    #[error("no frame source registered")]
    NoFrameSource,

    /// 通道已关闭
    #[error("channel closed for source {source_id}")]
    ChannelClosed {
        /// 源 ID
        source_id: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
