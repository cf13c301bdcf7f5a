//! # SensorStream Control API
//!
//! ## Purpose
//!
//! Small JSON-over-HTTP control plane for a sensor node: health, sensor
//! listing, per-sensor start/stop and publisher counters. Built on warp and
//! operating on a shared [`SensorRegistry`](sensors::SensorRegistry).
//!
//! ```text
//! HTTP client ──► warp routes ──► SensorRegistry ──► Sensor::start / stop
//!                      │
//!                      └────────► Publisher counters (/metrics)
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use routes::{routes, ApiState};
pub use server::{bind, serve};
