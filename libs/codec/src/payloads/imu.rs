use crate::error::ProtocolResult;
use crate::header::MessageType;
use crate::sequence::SequenceCounter;
use crate::wire::{put_f32, put_string, put_u64, string_len, WireReader};

use super::SensorPayload;

static IMU_SEQUENCE: SequenceCounter = SequenceCounter::new();

/// Inertial sample: linear acceleration (m/s²) and angular rate (rad/s)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImuData {
    pub sensor_id: Vec<u8>,
    pub timestamp_ns: u64,
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
    pub gyro_x: f32,
    pub gyro_y: f32,
    pub gyro_z: f32,
}

impl ImuData {
    const FIXED_SIZE: usize = 8 + 6 * 4;

    pub fn new(
        sensor_id: impl Into<Vec<u8>>,
        timestamp_ns: u64,
        accel: [f32; 3],
        gyro: [f32; 3],
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp_ns,
            accel_x: accel[0],
            accel_y: accel[1],
            accel_z: accel[2],
            gyro_x: gyro[0],
            gyro_y: gyro[1],
            gyro_z: gyro[2],
        }
    }

    pub fn accel(&self) -> [f32; 3] {
        [self.accel_x, self.accel_y, self.accel_z]
    }

    pub fn gyro(&self) -> [f32; 3] {
        [self.gyro_x, self.gyro_y, self.gyro_z]
    }
}

impl SensorPayload for ImuData {
    const MESSAGE_TYPE: MessageType = MessageType::Imu;

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
        for value in self.accel().into_iter().chain(self.gyro()) {
            put_f32(buffer, value);
        }
    }

    fn encoded_len(&self) -> usize {
        string_len(&self.sensor_id) + Self::FIXED_SIZE
    }

    fn decode_from(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let sensor_id = reader.read_string("sensor_id")?;
        reader.ensure(Self::FIXED_SIZE, "imu fields")?;
        Ok(Self {
            sensor_id,
            timestamp_ns: reader.read_u64("timestamp_ns")?,
            accel_x: reader.read_f32("accel_x")?,
            accel_y: reader.read_f32("accel_y")?,
            accel_z: reader.read_f32("accel_z")?,
            gyro_x: reader.read_f32("gyro_x")?,
            gyro_y: reader.read_f32("gyro_y")?,
            gyro_z: reader.read_f32("gyro_z")?,
        })
    }

    fn sequence() -> &'static SequenceCounter {
        &IMU_SEQUENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let sample = ImuData::new("imu_main", 99, [0.01, -0.02, 9.81], [0.001, 0.0, -0.003]);
        let mut buffer = Vec::new();
        sample.encode(&mut buffer);
        assert_eq!(buffer.len(), 4 + 8 + 8 + 24);
        assert_eq!(ImuData::decode(&buffer).unwrap(), sample);
    }

    #[test]
    fn test_non_finite_values_roundtrip_bitwise() {
        let sample = ImuData::new(
            "imu",
            0,
            [f32::NAN, f32::INFINITY, f32::NEG_INFINITY],
            [f32::MIN, f32::MAX, -0.0],
        );
        let mut buffer = Vec::new();
        sample.encode(&mut buffer);
        let decoded = ImuData::decode(&buffer).unwrap();
        let bits = |d: &ImuData| {
            d.accel()
                .into_iter()
                .chain(d.gyro())
                .map(f32::to_bits)
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&decoded), bits(&sample));
    }

    #[test]
    fn test_length_prefix_only_fails() {
        // Declares a 3-byte id but carries nothing after the prefix
        let buffer = 3u32.to_le_bytes();
        assert!(ImuData::decode(&buffer).is_err());
    }
}
