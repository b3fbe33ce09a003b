//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full - update dropped
    #[error("queue full for sink '{sink_name}', update {update_id} dropped")]
    QueueFull { sink_name: String, update_id: u64 },

    /// Worker task is gone
    #[error("sink '{sink_name}' worker closed")]
    WorkerClosed { sink_name: String },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether the error only cost a single update
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}

/// Audio device failures reported by a [`SoundPlayer`](crate::SoundPlayer)
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio device busy")]
    DeviceBusy,

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("audio device error: {0}")]
    Device(String),
}
