//! Multipart framing on byte streams
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────────┬─────────────┐
//! │ flags u8 │ length u32LE │ body bytes  │  × N frames
//! └──────────┴──────────────┴─────────────┘
//! flags bit 0 (MORE): another frame of the same message follows
//! ```
//!
//! A message is the run of frames up to and including the first frame
//! without MORE. Pub/sub traffic is `[topic, data]`; the frame layer itself
//! accepts any count so the receiving side can report wrong shapes.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Result, TransportError};

/// Frame flag: another frame of the same message follows
pub const FLAG_MORE: u8 = 0x01;

/// Per-frame overhead (flags + length)
pub const FRAME_HEADER_SIZE: usize = 5;

/// Upper bound on frames in one message
pub const MAX_FRAMES_PER_MESSAGE: usize = 64;

/// Encode `frames` as one contiguous buffer so a single write delivers the
/// whole message
pub fn encode_multipart<B: AsRef<[u8]>>(frames: &[B]) -> Result<Bytes> {
    if frames.is_empty() {
        return Err(TransportError::protocol_violation("message has no frames"));
    }
    let total: usize = frames
        .iter()
        .map(|f| FRAME_HEADER_SIZE + f.as_ref().len())
        .sum();
    let mut buffer = BytesMut::with_capacity(total);
    let last = frames.len() - 1;
    for (index, frame) in frames.iter().enumerate() {
        let body = frame.as_ref();
        let len = u32::try_from(body.len()).map_err(|_| {
            TransportError::protocol_violation(format!("frame of {} bytes is too large", body.len()))
        })?;
        buffer.put_u8(if index < last { FLAG_MORE } else { 0 });
        buffer.put_u32_le(len);
        buffer.put_slice(body);
    }
    Ok(buffer.freeze())
}

/// Read one multipart message
///
/// Returns `Ok(None)` on a clean end of stream at a message boundary. EOF in
/// the middle of a message, an oversize frame or too many frames is an error;
/// the caller should drop the connection.
pub async fn read_multipart<R>(reader: &mut R, max_message_size: usize) -> Result<Option<Vec<Bytes>>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut frames = Vec::with_capacity(2);
    let mut total = 0usize;
    loop {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        if frames.is_empty() {
            // Distinguish a clean close from a truncated frame header
            let n = reader
                .read(&mut header[..1])
                .await
                .map_err(|e| TransportError::io("Failed to read frame", e))?;
            if n == 0 {
                return Ok(None);
            }
            reader
                .read_exact(&mut header[1..])
                .await
                .map_err(|e| TransportError::io("Truncated frame header", e))?;
        } else {
            reader
                .read_exact(&mut header)
                .await
                .map_err(|e| TransportError::io("Truncated frame header", e))?;
        }

        let flags = header[0];
        let len = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
        total = total.saturating_add(len);
        if total > max_message_size {
            return Err(TransportError::protocol_violation(format!(
                "message exceeds {} bytes",
                max_message_size
            )));
        }

        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .await
            .map_err(|e| TransportError::io("Truncated frame body", e))?;
        frames.push(Bytes::from(body));

        if flags & FLAG_MORE == 0 {
            return Ok(Some(frames));
        }
        if frames.len() >= MAX_FRAMES_PER_MESSAGE {
            return Err(TransportError::protocol_violation(format!(
                "message exceeds {} frames",
                MAX_FRAMES_PER_MESSAGE
            )));
        }
    }
}
