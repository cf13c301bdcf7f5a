//! Bound-checked little-endian primitives shared by every payload layout
//!
//! Strings travel as `u32` length + raw bytes with no encoding validation.
//! [`WireReader`] checks the remaining length before each read using checked
//! arithmetic, so a corrupt prefix such as `u32::MAX` fails cleanly.

use crate::error::{ProtocolError, ProtocolResult};

/// Size of a string length prefix on the wire
pub const STRING_PREFIX_SIZE: usize = 4;

/// Encoded size of a length-prefixed string
#[inline]
pub fn string_len(bytes: &[u8]) -> usize {
    STRING_PREFIX_SIZE + bytes.len()
}

#[inline]
pub fn put_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_u64(buffer: &mut Vec<u8>, value: u64) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn put_f32(buffer: &mut Vec<u8>, value: f32) {
    buffer.extend_from_slice(&value.to_bits().to_le_bytes());
}

/// Append a length-prefixed byte string
///
/// Strings longer than `u32::MAX` bytes cannot be represented; the length is
/// saturated, which a decoder then reports as truncation.
pub fn put_string(buffer: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buffer, u32::try_from(bytes.len()).unwrap_or(u32::MAX));
    buffer.extend_from_slice(bytes);
}

/// Cursor over an encoded buffer
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Fail unless `need` more bytes are available
    pub fn ensure(&self, need: usize, context: &str) -> ProtocolResult<()> {
        if self.remaining() < need {
            return Err(ProtocolError::message_too_small(
                need,
                self.remaining(),
                format!("{} at offset {}", context, self.offset),
            ));
        }
        Ok(())
    }

    fn take(&mut self, len: usize, context: &str) -> ProtocolResult<&'a [u8]> {
        self.ensure(len, context)?;
        let data = self.data;
        let slice = &data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, context: &str) -> ProtocolResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub fn read_u16(&mut self, context: &str) -> ProtocolResult<u16> {
        self.take_array::<2>(context).map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self, context: &str) -> ProtocolResult<u32> {
        self.take_array::<4>(context).map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self, context: &str) -> ProtocolResult<u64> {
        self.take_array::<8>(context).map(u64::from_le_bytes)
    }

    /// Reads the raw bit pattern, so NaN payloads survive untouched
    pub fn read_f32(&mut self, context: &str) -> ProtocolResult<f32> {
        self.take_array::<4>(context)
            .map(|bytes| f32::from_bits(u32::from_le_bytes(bytes)))
    }

    /// Read a length-prefixed byte string
    pub fn read_string(&mut self, field: &'static str) -> ProtocolResult<Vec<u8>> {
        let declared = self.read_u32(field)?;
        let available = self.remaining();
        match usize::try_from(declared) {
            Ok(len) if len <= available => Ok(self.take(len, field)?.to_vec()),
            _ => Err(ProtocolError::truncated_string(
                field,
                declared,
                available,
                self.offset,
            )),
        }
    }
}
