use crate::error::ProtocolResult;
use crate::header::MessageType;
use crate::sequence::SequenceCounter;
use crate::wire::{put_f32, put_string, put_u32, put_u64, string_len, WireReader};

use super::SensorPayload;

static LIDAR_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// Summary of one lidar sweep
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LidarScanData {
    pub sensor_id: Vec<u8>,
    pub timestamp_ns: u64,
    pub num_points: u32,
    pub scan_duration_ms: f32,
}

impl LidarScanData {
    const FIXED_SIZE: usize = 8 + 4 + 4;

    pub fn new(
        sensor_id: impl Into<Vec<u8>>,
        timestamp_ns: u64,
        num_points: u32,
        scan_duration_ms: f32,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp_ns,
            num_points,
            scan_duration_ms,
        }
    }
}

impl SensorPayload for LidarScanData {
    const MESSAGE_TYPE: MessageType = MessageType::LidarScan;

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
        put_u32(buffer, self.num_points);
        put_f32(buffer, self.scan_duration_ms);
    }

    fn encoded_len(&self) -> usize {
        string_len(&self.sensor_id) + Self::FIXED_SIZE
    }

    fn decode_from(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let sensor_id = reader.read_string("sensor_id")?;
        reader.ensure(Self::FIXED_SIZE, "lidar scan fields")?;
        Ok(Self {
            sensor_id,
            timestamp_ns: reader.read_u64("timestamp_ns")?,
            num_points: reader.read_u32("num_points")?,
            scan_duration_ms: reader.read_f32("scan_duration_ms")?,
        })
    }

    fn sequence() -> &'static SequenceCounter {
        &LIDAR_SEQUENCE
    }
}
