//! # SensorStream Network
//!
//! Topic-based publish/subscribe over byte streams.
//!
//! ## Architecture Role
//!
//! ```text
//!  PeriodicPublisher ──► Publisher ══[topic|data]══► (Broker) ══► Subscriber ──► receive::<T>
//!                        bind / connect      tcp:// or ipc://       connect + prefix filter
//! ```
//!
//! ## Module Map
//!
//! - [`publisher`] / [`subscriber`]: the two socket roles
//! - [`periodic`]: fixed-interval publishing loop
//! - [`frame`]: multipart framing on a stream
//! - [`transports`]: TCP and Unix domain socket streams
//! - [`endpoint`]: `tcp://` / `ipc://` endpoint parsing
//! - [`cancel`]: cooperative cancellation token
//! - [`config`]: serde/TOML socket configuration
//!
//! ## Blocking Semantics
//!
//! `publish_raw` and `receive_raw` wait for readiness in slices of at most
//! 100ms, checking the caller's [`CancellationToken`] between slices, until
//! the configured timeout (negative = forever) elapses. Both fail fast with
//! [`TransportError::NotConnected`] before bind/connect.

pub mod cancel;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod periodic;
pub mod poll;
pub mod publisher;
mod queue;
pub mod subscriber;
pub mod transports;

pub use cancel::CancellationToken;
pub use config::{PublisherConfig, SubscriberConfig};
pub use endpoint::Endpoint;
pub use error::{ErrorKind, Result, TransportError};
pub use periodic::PeriodicPublisher;
pub use poll::POLL_SLICE;
pub use publisher::Publisher;
pub use subscriber::Subscriber;
