//! Fixed 16-byte message header
//!
//! ```text
//! offset  size  field
//! 0       8     timestamp_ns     (u64, little-endian)
//! 8       4     sequence_number  (u32, little-endian)
//! 12      2     message_type     (u16, little-endian)
//! 14      2     reserved         (u16, always 0 on encode)
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{ProtocolError, ProtocolResult};
use crate::wire::{put_u16, put_u32, put_u64, WireReader};

/// Payload kinds carried in the header's `message_type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum MessageType {
    CameraFrame = 1,
    LidarScan = 2,
    Imu = 3,
}

impl MessageType {
    pub fn name(self) -> &'static str {
        match self {
            MessageType::CameraFrame => "camera_frame",
            MessageType::LidarScan => "lidar_scan",
            MessageType::Imu => "imu",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Header prepended to every payload on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub timestamp_ns: u64,
    pub sequence_number: u32,
    pub message_type: u16,
    pub reserved: u16,
}

impl MessageHeader {
    pub const SIZE: usize = 16;

    /// Append the 16 header bytes to `buffer`
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(Self::SIZE);
        put_u64(buffer, self.timestamp_ns);
        put_u32(buffer, self.sequence_number);
        put_u16(buffer, self.message_type);
        put_u16(buffer, self.reserved);
    }

    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        if data.len() < Self::SIZE {
            return Err(ProtocolError::message_too_small(
                Self::SIZE,
                data.len(),
                "message header",
            ));
        }
        let mut reader = WireReader::new(&data[..Self::SIZE]);
        Ok(Self {
            timestamp_ns: reader.read_u64("timestamp_ns")?,
            sequence_number: reader.read_u32("sequence_number")?,
            message_type: reader.read_u16("message_type")?,
            reserved: reader.read_u16("reserved")?,
        })
    }

    /// Typed view of `message_type`, if it names a known payload
    pub fn kind(&self) -> ProtocolResult<MessageType> {
        MessageType::try_from(self.message_type).map_err(|_| ProtocolError::UnknownMessageType {
            message_type: self.message_type,
        })
    }
}
