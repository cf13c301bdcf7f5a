//! Sensor payload layouts
//!
//! All payloads share the same leading fields (`sensor_id` string, then
//! `timestamp_ns`), followed by a fixed-size, type-specific block:
//!
//! ```text
//! CameraFrameData  String(sensor_id) | u64 ts | u32 frame_id | u32 width | u32 height | String(encoding)
//! LidarScanData    String(sensor_id) | u64 ts | u32 num_points | f32 scan_duration_ms
//! ImuData          String(sensor_id) | u64 ts | f32 accel_x..z | f32 gyro_x..z
//! ```
//!
//! Strings are raw bytes (`u32` length prefix, no terminator, no encoding
//! check); every multi-byte field is little-endian.

mod camera;
mod imu;
mod lidar;

pub use camera::CameraFrameData;
pub use imu::ImuData;
pub use lidar::LidarScanData;

use std::borrow::Cow;

use crate::error::ProtocolResult;
use crate::header::MessageType;
use crate::sequence::SequenceCounter;
use crate::wire::WireReader;

/// A payload that can travel inside an [`Envelope`](crate::Envelope)
pub trait SensorPayload: Sized + Clone + Send + Sync + 'static {
    /// Value written to the header's `message_type` field
    const MESSAGE_TYPE: MessageType;

    fn sensor_id(&self) -> &[u8];

    fn timestamp_ns(&self) -> u64;

    /// Display form of `sensor_id`; invalid UTF-8 is replaced, never rejected
    fn sensor_id_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.sensor_id())
    }

    /// Append the encoded payload to `buffer` without clearing it
    fn encode(&self, buffer: &mut Vec<u8>);

    /// Exact number of bytes [`encode`](Self::encode) appends
    fn encoded_len(&self) -> usize;

    /// Decode from the reader's position, consuming exactly this payload's bytes
    fn decode_from(reader: &mut WireReader<'_>) -> ProtocolResult<Self>;

    /// Decode from the start of `data`; trailing bytes are ignored
    fn decode(data: &[u8]) -> ProtocolResult<Self> {
        Self::decode_from(&mut WireReader::new(data))
    }

    /// Process-wide sequence counter for this payload type
    fn sequence() -> &'static SequenceCounter;
}
