//! # Sensor Node Configuration
//!
//! ```toml
//! role = "bind"            # or "connect" to publish into a broker frontend
//! autostart = true
//!
//! [publisher]
//! endpoint = "tcp://*:5555"
//! high_water_mark = 1000
//!
//! [api]
//! port = 8080
//!
//! [[sensors]]
//! id = "camera_front"
//! kind = "camera"
//! interval_ms = 33
//! ```
//!
//! Every section is optional. Omitting `sensors` yields the default trio
//! (`camera_front`, `lidar_top`, `imu_main`); an explicit empty list means
//! no sensors.

use std::path::Path;

use control_api::ApiConfig;
use network::PublisherConfig;
use sensors::{SensorKind, SensorSpec};
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, Result};

/// How the node's publisher attaches to its endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Subscribers connect to this node
    #[default]
    Bind,
    /// This node connects out, typically to a broker frontend
    Connect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub role: Role,
    /// Start every sensor once the publisher is attached
    pub autostart: bool,
    pub publisher: PublisherConfig,
    pub api: ApiConfig,
    pub sensors: Vec<SensorSpec>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Bind,
            autostart: true,
            publisher: PublisherConfig::default(),
            api: ApiConfig::default(),
            sensors: default_sensors(),
        }
    }
}

pub fn default_sensors() -> Vec<SensorSpec> {
    vec![
        SensorSpec::new("camera_front", SensorKind::Camera, 33),
        SensorSpec::new("lidar_top", SensorKind::Lidar, 100),
        SensorSpec::new("imu_main", SensorKind::Imu, 10),
    ]
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| NodeError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate sensor ids; the registry would silently keep only the last
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for spec in &self.sensors {
            if !seen.insert(spec.id.as_str()) {
                return Err(NodeError::Config(format!(
                    "duplicate sensor id '{}'",
                    spec.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.role, Role::Bind);
        assert!(config.autostart);
        assert_eq!(config.publisher.endpoint, "tcp://*:5555");
        assert_eq!(config.api.port, 8080);
        let ids: Vec<_> = config.sensors.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["camera_front", "lidar_top", "imu_main"]);
    }

    #[test]
    fn test_partial_toml() {
        let config = NodeConfig::from_toml_str(
            r#"
role = "connect"
autostart = false

[publisher]
endpoint = "tcp://localhost:5555"

[api]
enabled = false

[[sensors]]
id = "imu_left"
kind = "imu"
interval_ms = 5
"#,
        )
        .unwrap();
        assert_eq!(config.role, Role::Connect);
        assert!(!config.autostart);
        assert_eq!(config.publisher.endpoint, "tcp://localhost:5555");
        assert_eq!(config.publisher.high_water_mark, 1000);
        assert!(!config.api.enabled);
        assert_eq!(config.sensors, vec![SensorSpec::new("imu_left", SensorKind::Imu, 5)]);
    }

    #[test]
    fn test_empty_sensor_list_is_kept() {
        let config = NodeConfig::from_toml_str("sensors = []").unwrap();
        assert!(config.sensors.is_empty());
    }

    #[test]
    fn test_rejects_duplicates_and_bad_kinds() {
        let duplicate = "[[sensors]]\nid = \"a\"\nkind = \"imu\"\n[[sensors]]\nid = \"a\"\nkind = \"lidar\"\n";
        assert!(matches!(
            NodeConfig::from_toml_str(duplicate),
            Err(NodeError::Config(_))
        ));
        assert!(NodeConfig::from_toml_str("[[sensors]]\nid = \"a\"\nkind = \"radar\"\n").is_err());
        assert!(NodeConfig::from_toml_str("role = \"both\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "[api]\nport = 9090\n").unwrap();
        let config = NodeConfig::from_file(&path).unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.sensors.len(), 3);

        assert!(NodeConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
