//! Socket configuration
//!
//! Both structs deserialize from partial TOML: omitted fields take the
//! defaults below. A socket copies its configuration at construction and
//! never changes it afterwards.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// Default cap for a single frame or message on the wire
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16MB

/// Default delay between reconnection attempts
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Endpoint to bind (server role) or connect (client role)
    pub endpoint: String,
    /// Per-peer outbound queue bound in messages; `<= 0` means unbounded
    pub high_water_mark: i32,
    /// Send timeout in milliseconds; negative waits forever
    pub send_timeout_ms: i64,
    /// Keep only the newest unsent message per topic
    pub conflate: bool,
    /// Largest frame accepted from or sent to a peer
    pub max_message_size: usize,
    /// Reconnect delay for the client role
    pub reconnect_interval_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://*:5555".to_string(),
            high_water_mark: 1000,
            send_timeout_ms: 1000,
            conflate: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
        }
    }
}

impl PublisherConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_toml(path.as_ref())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_toml(content)
    }

    pub(crate) fn queue_capacity(&self) -> Option<usize> {
        capacity(self.high_water_mark)
    }

    pub(crate) fn send_timeout(&self) -> Option<Duration> {
        timeout(self.send_timeout_ms)
    }

    pub(crate) fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Endpoint to connect to
    pub endpoint: String,
    /// Inbound queue bound in messages; `<= 0` means unbounded
    pub high_water_mark: i32,
    /// Receive timeout in milliseconds; negative waits forever
    pub receive_timeout_ms: i64,
    /// Keep only the newest unread message per topic
    pub conflate: bool,
    pub max_message_size: usize,
    pub reconnect_interval_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://localhost:5555".to_string(),
            high_water_mark: 1000,
            receive_timeout_ms: 1000,
            conflate: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
        }
    }
}

impl SubscriberConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_toml(path.as_ref())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_toml(content)
    }

    pub(crate) fn queue_capacity(&self) -> Option<usize> {
        capacity(self.high_water_mark)
    }

    pub(crate) fn receive_timeout(&self) -> Option<Duration> {
        timeout(self.receive_timeout_ms)
    }

    pub(crate) fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms.max(1))
    }
}

fn capacity(high_water_mark: i32) -> Option<usize> {
    usize::try_from(high_water_mark).ok().filter(|&hwm| hwm > 0)
}

fn timeout(timeout_ms: i64) -> Option<Duration> {
    u64::try_from(timeout_ms).ok().map(Duration::from_millis)
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TransportError::configuration(
            format!("Failed to read config file {}: {}", path.display(), e),
            None,
        )
    })?;
    parse_toml(&content)
}

fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content)
        .map_err(|e| TransportError::configuration(format!("Failed to parse config: {}", e), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let publisher = PublisherConfig::default();
        assert_eq!(publisher.endpoint, "tcp://*:5555");
        assert_eq!(publisher.high_water_mark, 1000);
        assert_eq!(publisher.send_timeout_ms, 1000);
        assert!(!publisher.conflate);

        let subscriber = SubscriberConfig::default();
        assert_eq!(subscriber.endpoint, "tcp://localhost:5555");
        assert_eq!(subscriber.receive_timeout_ms, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SubscriberConfig::from_toml_str(
            r#"
            endpoint = "ipc:///tmp/bus.sock"
            conflate = true
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "ipc:///tmp/bus.sock");
        assert!(config.conflate);
        assert_eq!(config.high_water_mark, 1000);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = PublisherConfig::from_toml_str("high_water_mark = \"lots\"").unwrap_err();
        assert!(matches!(err, TransportError::Configuration { .. }));
    }

    #[test]
    fn test_timeout_and_capacity_semantics() {
        let mut config = PublisherConfig::default();
        assert_eq!(config.send_timeout(), Some(Duration::from_millis(1000)));
        assert_eq!(config.queue_capacity(), Some(1000));

        config.send_timeout_ms = -1;
        config.high_water_mark = 0;
        assert_eq!(config.send_timeout(), None);
        assert_eq!(config.queue_capacity(), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("publisher.toml");
        std::fs::write(&path, "endpoint = \"tcp://127.0.0.1:7000\"\nsend_timeout_ms = 5\n").unwrap();
        let config = PublisherConfig::from_file(&path).unwrap();
        assert_eq!(config.endpoint, "tcp://127.0.0.1:7000");
        assert_eq!(config.send_timeout_ms, 5);

        assert!(PublisherConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
