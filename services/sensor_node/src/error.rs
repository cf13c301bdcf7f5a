//! # Sensor Node Error Types

use network::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    /// Configuration loading and validation errors
    #[error("Config error: {0}")]
    Config(String),

    /// Publisher attach failures
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Control API bind failures
    #[error("API error: {0}")]
    Api(#[from] control_api::ApiError),
}

pub type Result<T> = std::result::Result<T, NodeError>;
