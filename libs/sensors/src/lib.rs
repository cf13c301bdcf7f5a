//! # SensorStream Sensors
//!
//! ## Purpose
//!
//! The node-side view of data sources: the [`Sensor`] trait, simulated
//! camera/lidar/IMU sensors publishing through a shared
//! [`Publisher`](network::Publisher), and the [`SensorRegistry`] the control
//! API operates on.
//!
//! ## Architecture Role
//!
//! ```text
//! SensorRegistry ──► Arc<dyn Sensor> ──► PeriodicPublisher ──► Publisher ──► subscribers
//!        ▲
//!        └── control API (list / start / stop)
//! ```

pub mod error;
pub mod registry;
pub mod sensor;
pub mod simulated;

pub use error::{Result, SensorError};
pub use registry::{SensorRegistry, SensorStatus};
pub use sensor::{Sensor, SensorKind};
pub use simulated::{build_sensor, CameraSensor, ImuSensor, LidarSensor, SensorSpec, SimulatedSensor};
