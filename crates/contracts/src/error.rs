//! Layered error definitions
//!
//! Categorized by source: config / sensor / speech / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sensor Errors =====
    /// Sensor could not be opened or started
    #[error("sensor '{source_id}' unavailable: {message}")]
    SensorUnavailable { source_id: String, message: String },

    /// Recorded frame could not be decoded
    #[error("frame decode error for source '{source_id}': {message}")]
    FrameDecode { source_id: String, message: String },

    // ===== Speech Errors =====
    /// No installed recognizer matches the requested culture / sensor audio
    #[error("no speech recognizer for culture '{culture}' with sensor audio support")]
    NoRecognizer { culture: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sound playback error
    #[error("sink '{sink_name}' playback error for '{asset}': {message}")]
    Playback {
        sink_name: String,
        asset: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor unavailable error
    pub fn sensor_unavailable(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create frame decode error
    pub fn frame_decode(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FrameDecode {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create missing recognizer error
    pub fn no_recognizer(culture: impl Into<String>) -> Self {
        Self::NoRecognizer {
            culture: culture.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create playback error
    pub fn playback(
        sink_name: impl Into<String>,
        asset: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Playback {
            sink_name: sink_name.into(),
            asset: asset.into(),
            message: message.into(),
        }
    }
}
