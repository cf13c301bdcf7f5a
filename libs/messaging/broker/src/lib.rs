//! # SensorStream Broker
//!
//! Many-to-many relay between publishers and subscribers: publishers connect
//! to the frontend endpoint, subscribers to the backend endpoint, and every
//! message is forwarded verbatim. See [`relay`] for the data path.

pub mod config;
pub mod error;
pub mod relay;

pub use config::BrokerConfig;
pub use error::{BrokerError, Result};
pub use relay::{Broker, BrokerStats};
