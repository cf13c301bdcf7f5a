//! # Broker Error Types

use network::TransportError;
use thiserror::Error;

/// Broker operation errors
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Configuration loading and validation errors
    #[error("Config error: {0}")]
    Config(String),

    /// Frontend or backend socket errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// IO errors from tokio operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for broker operations
pub type Result<T> = std::result::Result<T, BrokerError>;
