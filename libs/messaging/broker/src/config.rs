//! # Broker Configuration
//!
//! ```toml
//! frontend_endpoint = "tcp://*:5555"   # publishers connect here
//! backend_endpoint = "tcp://*:5556"    # subscribers connect here
//! high_water_mark = 1000               # per-subscriber queue bound
//! send_timeout_ms = 1000
//! ```

use std::path::Path;

use network::config::DEFAULT_MAX_MESSAGE_SIZE;
use network::PublisherConfig;
use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub frontend_endpoint: String,
    pub backend_endpoint: String,
    pub high_water_mark: i32,
    pub send_timeout_ms: i64,
    pub max_message_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            frontend_endpoint: "tcp://*:5555".to_string(),
            backend_endpoint: "tcp://*:5556".to_string(),
            high_water_mark: 1000,
            send_timeout_ms: 1000,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BrokerError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| BrokerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Socket settings for the subscriber-facing side
    pub fn backend_config(&self) -> PublisherConfig {
        PublisherConfig {
            endpoint: self.backend_endpoint.clone(),
            high_water_mark: self.high_water_mark,
            send_timeout_ms: self.send_timeout_ms,
            conflate: false,
            max_message_size: self.max_message_size,
            ..PublisherConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_classic_ports() {
        let config = BrokerConfig::default();
        assert_eq!(config.frontend_endpoint, "tcp://*:5555");
        assert_eq!(config.backend_endpoint, "tcp://*:5556");
        assert_eq!(config.backend_config().endpoint, "tcp://*:5556");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broker.toml");
        std::fs::write(&path, "backend_endpoint = \"ipc:///tmp/bus.sock\"\nhigh_water_mark = 10\n").unwrap();

        let config = BrokerConfig::from_file(&path).unwrap();
        assert_eq!(config.frontend_endpoint, "tcp://*:5555");
        assert_eq!(config.backend_endpoint, "ipc:///tmp/bus.sock");
        assert_eq!(config.backend_config().high_water_mark, 10);

        std::fs::write(&path, "high_water_mark = [").unwrap();
        assert!(matches!(BrokerConfig::from_file(&path), Err(BrokerError::Config(_))));
    }
}
