//! # SensorStream Codec
//!
//! ## Purpose
//!
//! The "rules" layer of SensorStream: how a sensor reading becomes bytes and
//! back. Every message on the bus is one [`Envelope`]: a fixed 16-byte
//! [`MessageHeader`] followed by a type-specific payload.
//!
//! ## Architecture Role
//!
//! ```text
//! sensors → [codec] → network
//!     ↑        ↓          ↓
//! Readings  Envelope   Pub/Sub
//!           Encoding   Sockets
//! ```
//!
//! ## What This Crate Contains
//! - [`MessageHeader`] and the [`MessageType`] registry
//! - Payload layouts: [`CameraFrameData`], [`LidarScanData`], [`ImuData`]
//! - [`Envelope`] encode/decode plus [`SensorMessage`] dispatch by type
//! - Per-type [`SequenceCounter`]s and the monotonic [`timestamp_ns`] clock
//!
//! ## What This Crate Does NOT Contain
//! - Sockets, topics or framing (belongs in `network`)
//! - Schema versioning: the header layout is fixed
//!
//! ## Byte Order
//!
//! Every multi-byte field is little-endian, independent of the host.
//!
//! ## Usage
//!
//! ```rust
//! use codec::{Envelope, ImuData};
//!
//! let envelope = Envelope::new(ImuData::new("imu_main", 0, [0.0, 0.0, 9.81], [0.0; 3]));
//! let bytes = envelope.to_bytes();
//! let decoded = Envelope::<ImuData>::decode(&bytes).unwrap();
//! assert_eq!(decoded, envelope);
//! ```

pub mod envelope;
pub mod error;
pub mod header;
pub mod payloads;
pub mod sequence;
pub mod time;
pub mod wire;

pub use envelope::{Envelope, SensorMessage};
pub use error::{ProtocolError, ProtocolResult};
pub use header::{MessageHeader, MessageType};
pub use payloads::{CameraFrameData, ImuData, LidarScanData, SensorPayload};
pub use sequence::SequenceCounter;
pub use time::timestamp_ns;
pub use wire::WireReader;
