//! Protocol-level errors for sensor message decoding
//!
//! Every decoder in this crate bound-checks before it reads, so a short or
//! corrupt buffer surfaces as one of these variants instead of a panic.
//! Each variant carries enough context (offsets, declared vs. available
//! sizes) to tell truncation apart from a corrupted length prefix.

use thiserror::Error;

/// Decoding failures for headers, payloads and envelopes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer is too small to contain the expected fixed-size block
    #[error("Message too small: need {need} bytes, got {got} (context: {context})")]
    MessageTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// A length-prefixed string declares more bytes than the buffer holds
    #[error("Truncated string field '{field}': declared {declared} bytes, {available} available (offset: {offset})")]
    TruncatedString {
        field: &'static str,
        declared: u32,
        available: usize,
        offset: usize,
    },

    /// Header carries a message type no payload is registered for
    #[error("Unknown message type {message_type}: known types are 1 (camera), 2 (lidar), 3 (imu)")]
    UnknownMessageType { message_type: u16 },
}

impl ProtocolError {
    /// Create a message too small error with context
    pub fn message_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::MessageTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    /// Create a truncated string error
    pub fn truncated_string(
        field: &'static str,
        declared: u32,
        available: usize,
        offset: usize,
    ) -> Self {
        Self::TruncatedString {
            field,
            declared,
            available,
            offset,
        }
    }
}

/// Result type for codec operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_too_small_display() {
        let error = ProtocolError::message_too_small(16, 15, "message header");
        assert_eq!(
            error.to_string(),
            "Message too small: need 16 bytes, got 15 (context: message header)"
        );
    }

    #[test]
    fn test_truncated_string_display_names_field() {
        let error = ProtocolError::truncated_string("sensor_id", 32, 4, 4);
        let text = error.to_string();
        assert!(text.contains("sensor_id"));
        assert!(text.contains("declared 32 bytes"));
    }
}
