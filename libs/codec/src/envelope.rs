//! Envelope = header + one typed payload
//!
//! ## Wire Format
//!
//! ```text
//! ┌────────────────────┬──────────────────────────────┐
//! │ MessageHeader (16) │ payload (type-specific size) │
//! └────────────────────┴──────────────────────────────┘
//! ```
//!
//! `encode` appends, so several envelopes can be packed back to back into one
//! buffer and walked with [`Envelope::decode_prefix`]. Typed decoding trusts
//! the caller's choice of payload type: the header's `message_type` is not
//! checked against `T`. Use [`SensorMessage::decode`] to dispatch on it.

use crate::error::ProtocolResult;
use crate::header::{MessageHeader, MessageType};
use crate::payloads::{CameraFrameData, ImuData, LidarScanData, SensorPayload};
use crate::time::timestamp_ns;
use crate::wire::WireReader;

/// A header paired with the payload it describes
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T: SensorPayload> {
    header: MessageHeader,
    payload: T,
}

impl<T: SensorPayload> Envelope<T> {
    /// Wrap `payload`, stamping the current time and the type's next sequence number
    pub fn new(payload: T) -> Self {
        let header = MessageHeader {
            timestamp_ns: timestamp_ns(),
            sequence_number: T::sequence().next(),
            message_type: T::MESSAGE_TYPE.into(),
            reserved: 0,
        };
        Self { header, payload }
    }

    /// Reassemble an envelope without touching clocks or counters
    pub fn from_parts(header: MessageHeader, payload: T) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn into_parts(self) -> (MessageHeader, T) {
        (self.header, self.payload)
    }

    pub fn encoded_len(&self) -> usize {
        MessageHeader::SIZE + self.payload.encoded_len()
    }

    /// Append header then payload to `buffer`
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(self.encoded_len());
        self.header.encode(buffer);
        self.payload.encode(buffer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buffer);
        buffer
    }

    /// Decode one envelope from the start of `data`; trailing bytes are ignored
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        Self::decode_prefix(data).map(|(envelope, _)| envelope)
    }

    /// Decode one envelope and report how many bytes it occupied
    pub fn decode_prefix(data: &[u8]) -> ProtocolResult<(Self, usize)> {
        let header = MessageHeader::decode(data)?;
        let mut reader = WireReader::new(&data[MessageHeader::SIZE..]);
        let payload = T::decode_from(&mut reader)?;
        Ok((Self { header, payload }, MessageHeader::SIZE + reader.position()))
    }
}

/// Any sensor envelope, selected by the header's `message_type`
#[derive(Debug, Clone, PartialEq)]
pub enum SensorMessage {
    Camera(Envelope<CameraFrameData>),
    Lidar(Envelope<LidarScanData>),
    Imu(Envelope<ImuData>),
}

impl SensorMessage {
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        let header = MessageHeader::decode(data)?;
        Ok(match header.kind()? {
            MessageType::CameraFrame => SensorMessage::Camera(Envelope::decode(data)?),
            MessageType::LidarScan => SensorMessage::Lidar(Envelope::decode(data)?),
            MessageType::Imu => SensorMessage::Imu(Envelope::decode(data)?),
        })
    }

    pub fn header(&self) -> &MessageHeader {
        match self {
            SensorMessage::Camera(e) => e.header(),
            SensorMessage::Lidar(e) => e.header(),
            SensorMessage::Imu(e) => e.header(),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            SensorMessage::Camera(_) => MessageType::CameraFrame,
            SensorMessage::Lidar(_) => MessageType::LidarScan,
            SensorMessage::Imu(_) => MessageType::Imu,
        }
    }

    pub fn sensor_id(&self) -> &[u8] {
        match self {
            SensorMessage::Camera(e) => e.payload().sensor_id(),
            SensorMessage::Lidar(e) => e.payload().sensor_id(),
            SensorMessage::Imu(e) => e.payload().sensor_id(),
        }
    }
}

impl From<Envelope<CameraFrameData>> for SensorMessage {
    fn from(envelope: Envelope<CameraFrameData>) -> Self {
        SensorMessage::Camera(envelope)
    }
}

impl From<Envelope<LidarScanData>> for SensorMessage {
    fn from(envelope: Envelope<LidarScanData>) -> Self {
        SensorMessage::Lidar(envelope)
    }
}

impl From<Envelope<ImuData>> for SensorMessage {
    fn from(envelope: Envelope<ImuData>) -> Self {
        SensorMessage::Imu(envelope)
    }
}
