//! # Sensor Error Types

use network::TransportError;
use thiserror::Error;

/// Sensor lifecycle and registry errors
#[derive(Error, Debug)]
pub enum SensorError {
    /// No sensor registered under this id
    #[error("Sensor not found: {id}")]
    NotFound { id: String },

    /// Failure from the sensor's publishing loop
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl SensorError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// True when `start` was refused because the sensor is already publishing
    pub fn is_already_running(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::AlreadyRunning { .. })
        )
    }
}

/// Result type alias for sensor operations
pub type Result<T> = std::result::Result<T, SensorError>;
