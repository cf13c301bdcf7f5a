//! Control API server configuration

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the API at all
    pub enabled: bool,

    /// HTTP bind address
    pub bind_address: String,

    /// HTTP port; 0 picks an ephemeral port
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ApiConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| ApiError::Configuration {
                message: format!("Invalid bind address '{}:{}': {}", self.bind_address, self.port, e),
            })
    }
}
