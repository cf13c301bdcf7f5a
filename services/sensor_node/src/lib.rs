//! # SensorStream Sensor Node
//!
//! ## Purpose
//!
//! Process wiring for a sensor node: one shared publisher, the configured
//! simulated sensors, and the optional HTTP control API.
//!
//! ```text
//! NodeConfig ──► SensorNode::start ──► Publisher (bind | connect)
//!                     │
//!                     ├──► SensorRegistry ──► simulated sensors ──► Publisher
//!                     └──► ApiState ──► control_api::serve
//! ```

pub mod config;
pub mod error;
pub mod node;

pub use config::{default_sensors, NodeConfig, Role};
pub use error::{NodeError, Result};
pub use node::SensorNode;
