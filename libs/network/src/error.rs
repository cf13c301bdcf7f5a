//! Transport Error Types
//!
//! Error handling for pub/sub sockets: endpoint and connection failures,
//! timeouts, cancellation, malformed messages and lifecycle misuse.
//! [`TransportError::kind`] collapses the variants into the coarse
//! [`ErrorKind`] categories callers usually branch on.

use codec::ProtocolError;
use thiserror::Error;

/// Coarse failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad endpoint, address in use, I/O failure while attaching
    ConnectionFailure,
    /// The configured deadline elapsed before readiness
    Timeout,
    /// The caller's cancellation token fired
    Cancelled,
    /// Bytes that do not decode, or a message with the wrong shape
    MalformedMessage,
    /// An operation was called in the wrong lifecycle state
    InvalidState,
    /// Invalid configuration values
    Configuration,
}

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Endpoint parsing, binding or connecting failed
    #[error("Connection error: {message} (endpoint: {endpoint})")]
    Connection {
        endpoint: String,
        message: String,
        source: Option<std::io::Error>,
    },

    /// Readiness did not arrive within the configured timeout
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Cancellation requested by the caller
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Payload bytes failed to decode
    #[error("Malformed message: {0}")]
    Malformed(#[from] ProtocolError),

    /// A peer sent a message with an unexpected shape
    #[error("Protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// Socket has not been bound or connected
    #[error("Not connected: cannot {operation} before bind/connect")]
    NotConnected { operation: String },

    /// Socket was already bound or connected
    #[error("Already attached to {endpoint}")]
    AlreadyAttached { endpoint: String },

    /// Background worker is already running
    #[error("Already running: {what}")]
    AlreadyRunning { what: String },

    /// Unsubscribe of a prefix that is not in the subscription set
    #[error("Not subscribed to prefix {prefix:?}")]
    NotSubscribed { prefix: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Generic I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        source: std::io::Error,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a connection error
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    pub fn not_connected(operation: impl Into<String>) -> Self {
        Self::NotConnected {
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Coarse category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Connection { .. } | TransportError::Io { .. } => {
                ErrorKind::ConnectionFailure
            }
            TransportError::Timeout { .. } => ErrorKind::Timeout,
            TransportError::Cancelled { .. } => ErrorKind::Cancelled,
            TransportError::Malformed(_) | TransportError::ProtocolViolation { .. } => {
                ErrorKind::MalformedMessage
            }
            TransportError::NotConnected { .. }
            | TransportError::AlreadyAttached { .. }
            | TransportError::AlreadyRunning { .. }
            | TransportError::NotSubscribed { .. } => ErrorKind::InvalidState,
            TransportError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Check if retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Io { .. }
                | TransportError::Connection { source: Some(_), .. }
        )
    }

    /// Get error category for logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Connection { .. } => "connection",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Cancelled { .. } => "cancelled",
            TransportError::Malformed(_) => "malformed",
            TransportError::ProtocolViolation { .. } => "protocol_violation",
            TransportError::NotConnected { .. } => "not_connected",
            TransportError::AlreadyAttached { .. } => "already_attached",
            TransportError::AlreadyRunning { .. } => "already_running",
            TransportError::NotSubscribed { .. } => "not_subscribed",
            TransportError::Configuration { .. } => "configuration",
            TransportError::Io { .. } => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            TransportError::connection("tcp://nowhere", "bad endpoint").kind(),
            ErrorKind::ConnectionFailure
        );
        assert_eq!(TransportError::timeout("publish", 10).kind(), ErrorKind::Timeout);
        assert_eq!(TransportError::cancelled("receive").kind(), ErrorKind::Cancelled);
        assert_eq!(
            TransportError::from(ProtocolError::message_too_small(16, 3, "header")).kind(),
            ErrorKind::MalformedMessage
        );
        assert_eq!(
            TransportError::not_connected("publish").kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn test_display_includes_context() {
        let error = TransportError::timeout("receive", 250);
        assert_eq!(error.to_string(), "Timeout error: receive exceeded 250ms");

        let error = TransportError::connection("tcp://*:99999", "invalid port");
        assert!(error.to_string().contains("tcp://*:99999"));
    }

    #[test]
    fn test_retryable() {
        assert!(TransportError::timeout("publish", 1).is_retryable());
        assert!(!TransportError::cancelled("publish").is_retryable());
        assert!(!TransportError::connection("x", "unparsable").is_retryable());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(TransportError::timeout("publish", 1).category(), "timeout");
        assert_eq!(
            TransportError::protocol_violation("one frame").category(),
            "protocol_violation"
        );
        assert_eq!(
            TransportError::AlreadyRunning { what: "loop".into() }.category(),
            "already_running"
        );
        assert_eq!(
            TransportError::from(ProtocolError::message_too_small(16, 3, "header")).category(),
            "malformed"
        );
    }
}
