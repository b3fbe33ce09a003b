//! Sensor rig error types

use contracts::ContractError;
use thiserror::Error;

/// Sensor rig specific error
#[derive(Debug, Error)]
pub enum RigError {
    /// Recording could not be read or decoded
    #[error("failed to load recording '{path}': {message}")]
    RecordingLoad { path: String, message: String },

    /// Sensor backend could not be opened
    #[error("sensor '{source_id}' could not be opened: {message}")]
    SourceUnavailable { source_id: String, message: String },

    /// No speech recognizer matches the requested culture
    #[error("no speech recognizer installed for culture '{culture}'")]
    NoRecognizer { culture: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl RigError {
    /// Create recording load error
    pub fn recording_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordingLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create source unavailable error
    pub fn source_unavailable(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

impl From<RigError> for ContractError {
    fn from(err: RigError) -> Self {
        match err {
            RigError::Contract(inner) => inner,
            RigError::NoRecognizer { culture } => ContractError::no_recognizer(culture),
            RigError::SourceUnavailable { source_id, message } => {
                ContractError::sensor_unavailable(source_id, message)
            }
            RigError::RecordingLoad { path, message } => ContractError::frame_decode(path, message),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, RigError>;
