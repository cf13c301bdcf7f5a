//! Sensor registry
//!
//! Owns the sensors of one node keyed by id. Listing order is the id order.
//! Registration happens while the node is being assembled (`&mut self`);
//! lifecycle calls afterwards only need `&self`, so the registry can be
//! shared behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SensorError};
use crate::sensor::{Sensor, SensorKind};

/// Point-in-time view of one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SensorKind,
    pub active: bool,
}

#[derive(Default)]
pub struct SensorRegistry {
    sensors: BTreeMap<String, Arc<dyn Sensor>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sensor`, replacing and returning any sensor with the same id
    pub fn add(&mut self, sensor: Arc<dyn Sensor>) -> Option<Arc<dyn Sensor>> {
        let replaced = self.sensors.insert(sensor.id().to_string(), sensor);
        if let Some(old) = &replaced {
            warn!(sensor = old.id(), "Replacing registered sensor");
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Sensor>> {
        self.sensors.get(id).cloned()
    }

    pub fn list(&self) -> Vec<Arc<dyn Sensor>> {
        self.sensors.values().cloned().collect()
    }

    pub fn statuses(&self) -> Vec<SensorStatus> {
        self.sensors
            .values()
            .map(|sensor| SensorStatus {
                id: sensor.id().to_string(),
                kind: sensor.kind(),
                active: sensor.is_active(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.sensors.values().filter(|s| s.is_active()).count()
    }

    pub fn start(&self, id: &str) -> Result<()> {
        self.lookup(id)?.start()
    }

    pub async fn stop(&self, id: &str) -> Result<()> {
        self.lookup(id)?.stop().await;
        Ok(())
    }

    /// Start every sensor; one failure does not prevent the others
    pub fn start_all(&self) -> Vec<(String, SensorError)> {
        let failures: Vec<_> = self
            .sensors
            .iter()
            .filter_map(|(id, sensor)| sensor.start().err().map(|e| (id.clone(), e)))
            .collect();
        for (id, error) in &failures {
            warn!(sensor = %id, error = %error, "Sensor failed to start");
        }
        info!(
            started = self.sensors.len() - failures.len(),
            failed = failures.len(),
            "📊 Sensors started"
        );
        failures
    }

    pub async fn stop_all(&self) {
        for sensor in self.sensors.values() {
            sensor.stop().await;
        }
        info!(sensors = self.sensors.len(), "All sensors stopped");
    }

    fn lookup(&self, id: &str) -> Result<&Arc<dyn Sensor>> {
        self.sensors.get(id).ok_or_else(|| SensorError::not_found(id))
    }
}

impl std::fmt::Debug for SensorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorRegistry")
            .field("sensors", &self.sensors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use network::TransportError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeSensor {
        id: &'static str,
        kind: SensorKind,
        active: AtomicBool,
    }

    impl FakeSensor {
        fn new(id: &'static str, kind: SensorKind) -> Arc<Self> {
            Arc::new(Self {
                id,
                kind,
                active: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl Sensor for FakeSensor {
        fn id(&self) -> &str {
            self.id
        }

        fn kind(&self) -> SensorKind {
            self.kind
        }

        fn start(&self) -> Result<()> {
            if self.active.swap(true, Ordering::SeqCst) {
                return Err(TransportError::AlreadyRunning {
                    what: self.id.to_string(),
                }
                .into());
            }
            Ok(())
        }

        async fn stop(&self) {
            self.active.store(false, Ordering::SeqCst);
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn registry() -> SensorRegistry {
        let mut registry = SensorRegistry::new();
        registry.add(FakeSensor::new("lidar_top", SensorKind::Lidar));
        registry.add(FakeSensor::new("camera_front", SensorKind::Camera));
        registry
    }

    #[test]
    fn test_listing_is_ordered_by_id() {
        let registry = registry();
        let ids: Vec<_> = registry.list().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(ids, ["camera_front", "lidar_top"]);
        assert_eq!(registry.len(), 2);
        assert!(SensorRegistry::new().is_empty());
    }

    #[test]
    fn test_add_replaces_same_id() {
        let mut registry = registry();
        let replaced = registry.add(FakeSensor::new("lidar_top", SensorKind::Imu));
        assert_eq!(replaced.map(|s| s.kind()), Some(SensorKind::Lidar));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("lidar_top").unwrap().kind(), SensorKind::Imu);
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_start_stop_by_id() {
        let registry = registry();
        registry.start("camera_front").unwrap();
        assert!(registry.get("camera_front").unwrap().is_active());
        assert_eq!(registry.active_count(), 1);

        let again = registry.start("camera_front").unwrap_err();
        assert!(again.is_already_running());

        registry.stop("camera_front").await.unwrap();
        assert_eq!(registry.active_count(), 0);

        assert!(matches!(
            registry.start("nope"),
            Err(SensorError::NotFound { .. })
        ));
        assert!(matches!(
            registry.stop("nope").await,
            Err(SensorError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_all_reports_failures_and_continues() {
        let registry = registry();
        registry.start("lidar_top").unwrap();

        let failures = registry.start_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "lidar_top");
        assert_eq!(registry.active_count(), 2);

        registry.stop_all().await;
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_status_serializes_kind_as_type() {
        let registry = registry();
        let json = serde_json::to_value(registry.statuses()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": "camera_front", "type": "camera", "active": false},
                {"id": "lidar_top", "type": "lidar", "active": false}
            ])
        );
    }
}
