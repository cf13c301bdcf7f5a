//! Simulated sensors
//!
//! Each simulated sensor wraps a [`PeriodicPublisher`] whose generator
//! fabricates a plausible reading. They exist to exercise the pipeline end
//! to end without hardware.
//!
//! | Sensor   | Topic    | Default interval | Reading                                   |
//! |----------|----------|------------------|-------------------------------------------|
//! | camera   | `camera` | 33 ms            | 1920x1080 `RGB8`, `frame_id` counts up    |
//! | lidar    | `lidar`  | 100 ms           | 100 000 points, duration = interval       |
//! | imu      | `imu`    | 10 ms            | gravity on z plus ±0.1 uniform noise      |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use codec::{timestamp_ns, CameraFrameData, ImuData, LidarScanData, SensorPayload};
use network::{PeriodicPublisher, Publisher};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::sensor::{Sensor, SensorKind};

pub const CAMERA_WIDTH: u32 = 1920;
pub const CAMERA_HEIGHT: u32 = 1080;
pub const CAMERA_ENCODING: &str = "RGB8";
pub const LIDAR_POINTS: u32 = 100_000;
pub const GRAVITY: f32 = 9.81;
pub const IMU_NOISE: f32 = 0.1;

/// A sensor whose readings come from a generator closure
pub struct SimulatedSensor<T: SensorPayload> {
    id: String,
    periodic: PeriodicPublisher<T>,
}

pub type CameraSensor = SimulatedSensor<CameraFrameData>;
pub type LidarSensor = SimulatedSensor<LidarScanData>;
pub type ImuSensor = SimulatedSensor<ImuData>;

impl<T: SensorPayload> SimulatedSensor<T> {
    fn with_generator(
        id: impl Into<String>,
        publisher: Arc<Publisher>,
        interval: Duration,
        generator: impl FnMut() -> T + Send + 'static,
    ) -> Self {
        let kind = SensorKind::from(T::MESSAGE_TYPE);
        Self {
            id: id.into(),
            periodic: PeriodicPublisher::new(publisher, kind.topic(), generator, interval),
        }
    }

    pub fn topic(&self) -> &str {
        self.periodic.topic()
    }

    pub fn interval(&self) -> Duration {
        self.periodic.interval()
    }
}

impl CameraSensor {
    pub fn camera(id: impl Into<String>, publisher: Arc<Publisher>, interval: Duration) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let mut frame_id: u32 = 0;
        Self::with_generator(id, publisher, interval, move || {
            let frame = CameraFrameData::new(
                sensor_id.as_bytes(),
                timestamp_ns(),
                frame_id,
                CAMERA_WIDTH,
                CAMERA_HEIGHT,
                CAMERA_ENCODING,
            );
            frame_id = frame_id.wrapping_add(1);
            frame
        })
    }
}

impl LidarSensor {
    pub fn lidar(id: impl Into<String>, publisher: Arc<Publisher>, interval: Duration) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let scan_duration_ms = interval.as_secs_f32() * 1000.0;
        Self::with_generator(id, publisher, interval, move || {
            LidarScanData::new(sensor_id.as_bytes(), timestamp_ns(), LIDAR_POINTS, scan_duration_ms)
        })
    }
}

impl ImuSensor {
    pub fn imu(id: impl Into<String>, publisher: Arc<Publisher>, interval: Duration) -> Self {
        let id = id.into();
        let sensor_id = id.clone();
        let mut rng = StdRng::from_entropy();
        Self::with_generator(id, publisher, interval, move || {
            let mut noise = || rng.gen_range(-IMU_NOISE..IMU_NOISE);
            let accel = [noise(), noise(), GRAVITY + noise()];
            let gyro = [noise(), noise(), noise()];
            ImuData::new(sensor_id.as_bytes(), timestamp_ns(), accel, gyro)
        })
    }
}

#[async_trait]
impl<T: SensorPayload> Sensor for SimulatedSensor<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SensorKind {
        SensorKind::from(T::MESSAGE_TYPE)
    }

    fn start(&self) -> Result<()> {
        self.periodic.start()?;
        info!(sensor = %self.id, kind = %self.kind(), topic = self.topic(), "📡 Sensor started");
        Ok(())
    }

    async fn stop(&self) {
        let was_running = self.periodic.is_running();
        self.periodic.stop().await;
        if was_running {
            info!(sensor = %self.id, "Sensor stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.periodic.is_running()
    }
}

/// Declarative sensor definition, as found in node configuration files
///
/// ```toml
/// [[sensors]]
/// id = "camera_front"
/// kind = "camera"
/// interval_ms = 33
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub id: String,
    pub kind: SensorKind,
    /// Falls back to the kind's default interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}

impl SensorSpec {
    pub fn new(id: impl Into<String>, kind: SensorKind, interval_ms: u64) -> Self {
        Self {
            id: id.into(),
            kind,
            interval_ms: Some(interval_ms),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.kind.default_interval())
    }
}

/// Construct the simulated sensor described by `spec`
pub fn build_sensor(spec: &SensorSpec, publisher: Arc<Publisher>) -> Arc<dyn Sensor> {
    let interval = spec.interval();
    match spec.kind {
        SensorKind::Camera => Arc::new(CameraSensor::camera(&spec.id, publisher, interval)),
        SensorKind::Lidar => Arc::new(LidarSensor::lidar(&spec.id, publisher, interval)),
        SensorKind::Imu => Arc::new(ImuSensor::imu(&spec.id, publisher, interval)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network::PublisherConfig;

    fn publisher() -> Arc<Publisher> {
        Arc::new(Publisher::new(PublisherConfig::default()))
    }

    #[test]
    fn test_build_sensor_uses_kind_topic_and_interval() {
        let sensor = build_sensor(&SensorSpec::new("lidar_top", SensorKind::Lidar, 250), publisher());
        assert_eq!(sensor.id(), "lidar_top");
        assert_eq!(sensor.kind(), SensorKind::Lidar);
        assert!(!sensor.is_active());

        let imu = ImuSensor::imu("imu_main", publisher(), Duration::from_millis(10));
        assert_eq!(imu.topic(), "imu");
        assert_eq!(imu.interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_spec_default_interval() {
        let spec: SensorSpec = toml::from_str("id = \"cam\"\nkind = \"camera\"").unwrap();
        assert_eq!(spec.interval_ms, None);
        assert_eq!(spec.interval(), Duration::from_millis(33));
    }
}
