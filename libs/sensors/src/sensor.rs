//! Sensor trait and classification

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use codec::MessageType;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sensor family, serialized as `camera` / `lidar` / `imu`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Camera,
    Lidar,
    Imu,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Camera => "camera",
            SensorKind::Lidar => "lidar",
            SensorKind::Imu => "imu",
        }
    }

    /// Topic the simulated sensor of this kind publishes on
    pub fn topic(&self) -> &'static str {
        self.as_str()
    }

    pub fn default_interval(&self) -> Duration {
        match self {
            SensorKind::Camera => Duration::from_millis(33),
            SensorKind::Lidar => Duration::from_millis(100),
            SensorKind::Imu => Duration::from_millis(10),
        }
    }
}

impl From<MessageType> for SensorKind {
    fn from(message_type: MessageType) -> Self {
        match message_type {
            MessageType::CameraFrame => SensorKind::Camera,
            MessageType::LidarScan => SensorKind::Lidar,
            MessageType::Imu => SensorKind::Imu,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "camera" => Ok(SensorKind::Camera),
            "lidar" => Ok(SensorKind::Lidar),
            "imu" => Ok(SensorKind::Imu),
            other => Err(format!("unknown sensor kind '{}'", other)),
        }
    }
}

/// A data source that can be started and stopped by id
///
/// `start` is synchronous and only spawns work; `stop` waits until the
/// sensor has stopped publishing.
#[async_trait]
pub trait Sensor: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> SensorKind;

    /// Begin publishing; fails if already active
    fn start(&self) -> Result<()>;

    /// Stop publishing; a no-op on an inactive sensor
    async fn stop(&self);

    fn is_active(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(SensorKind::Camera.to_string(), "camera");
        assert_eq!("LIDAR".parse::<SensorKind>().unwrap(), SensorKind::Lidar);
        assert!("radar".parse::<SensorKind>().is_err());
        assert_eq!(SensorKind::from(MessageType::Imu), SensorKind::Imu);
    }
}
