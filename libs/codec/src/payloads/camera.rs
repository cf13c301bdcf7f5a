use crate::error::ProtocolResult;
use crate::header::MessageType;
use crate::sequence::SequenceCounter;
use crate::wire::{put_string, put_u32, put_u64, string_len, WireReader};

use super::SensorPayload;

static CAMERA_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// Camera frame descriptor (image bytes travel out of band)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CameraFrameData {
    pub sensor_id: Vec<u8>,
    pub timestamp_ns: u64,
    pub frame_id: u32,
    pub width: u32,
    pub height: u32,
    pub encoding: Vec<u8>,
}

impl CameraFrameData {
    /// Fixed block between the two strings: timestamp, frame_id, width, height
    const FIXED_SIZE: usize = 8 + 4 + 4 + 4;

    pub fn new(
        sensor_id: impl Into<Vec<u8>>,
        timestamp_ns: u64,
        frame_id: u32,
        width: u32,
        height: u32,
        encoding: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp_ns,
            frame_id,
            width,
            height,
            encoding: encoding.into(),
        }
    }
}

impl SensorPayload for CameraFrameData {
    const MESSAGE_TYPE: MessageType = MessageType::CameraFrame;

    fn sensor_id(&self) -> &[u8] {
        &self.sensor_id
    }

    fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(self.encoded_len());
        put_string(buffer, &self.sensor_id);
        put_u64(buffer, self.timestamp_ns);
        put_u32(buffer, self.frame_id);
        put_u32(buffer, self.width);
        put_u32(buffer, self.height);
        put_string(buffer, &self.encoding);
    }

    fn encoded_len(&self) -> usize {
        string_len(&self.sensor_id) + Self::FIXED_SIZE + string_len(&self.encoding)
    }

    fn decode_from(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let sensor_id = reader.read_string("sensor_id")?;
        reader.ensure(Self::FIXED_SIZE, "camera frame fields")?;
        let timestamp_ns = reader.read_u64("timestamp_ns")?;
        let frame_id = reader.read_u32("frame_id")?;
        let width = reader.read_u32("width")?;
        let height = reader.read_u32("height")?;
        let encoding = reader.read_string("encoding")?;
        Ok(Self {
            sensor_id,
            timestamp_ns,
            frame_id,
            width,
            height,
            encoding,
        })
    }

    fn sequence() -> &'static SequenceCounter {
        &CAMERA_SEQUENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;

    fn sample() -> CameraFrameData {
        CameraFrameData::new("camera_front", 1_700_000_000_000_000_000, 42, 1920, 1080, "RGB8")
    }

    #[test]
    fn test_roundtrip() {
        let frame = sample();
        let mut buffer = Vec::new();
        frame.encode(&mut buffer);
        assert_eq!(buffer.len(), frame.encoded_len());
        assert_eq!(CameraFrameData::decode(&buffer).unwrap(), frame);
    }

    #[test]
    fn test_empty_strings() {
        let frame = CameraFrameData::new("", 0, 0, 0, 0, "");
        let mut buffer = Vec::new();
        frame.encode(&mut buffer);
        assert_eq!(buffer.len(), 4 + 20 + 4);
        assert_eq!(CameraFrameData::decode(&buffer).unwrap(), frame);
    }

    #[test]
    fn test_missing_encoding_string_fails() {
        let mut buffer = Vec::new();
        sample().encode(&mut buffer);
        // Drop the encoding's last byte
        buffer.pop();
        assert!(matches!(
            CameraFrameData::decode(&buffer),
            Err(ProtocolError::TruncatedString { field: "encoding", .. })
        ));
    }

    #[test]
    fn test_fixed_block_truncation_fails() {
        let mut buffer = Vec::new();
        sample().encode(&mut buffer);
        let cut = 4 + "camera_front".len() + 10;
        assert!(matches!(
            CameraFrameData::decode(&buffer[..cut]),
            Err(ProtocolError::MessageTooSmall { need: 20, got: 10, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_sensor_id_is_kept_raw() {
        let frame = CameraFrameData::new(&b"cam\xff"[..], 0, 0, 1, 1, "RGB8");
        let mut buffer = Vec::new();
        frame.encode(&mut buffer);
        let decoded = CameraFrameData::decode(&buffer).unwrap();
        assert_eq!(decoded.sensor_id, b"cam\xff");
        assert_eq!(decoded.sensor_id_lossy(), "cam\u{fffd}");
    }
}
