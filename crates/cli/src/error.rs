//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration in {path}: {source}")]
    ConfigInvalid {
        path: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Sensor could not be opened
    #[error("Sensor unavailable: {0}")]
    Sensor(#[from] sensor_rig::RigError),

    /// Pipeline wiring error
    #[error("Pipeline setup failed: {message}")]
    PipelineSetup { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_invalid(path: impl Into<String>, source: contracts::ContractError) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            source,
        }
    }

    pub fn pipeline_setup(message: impl ToString) -> Self {
        Self::PipelineSetup {
            message: message.to_string(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
