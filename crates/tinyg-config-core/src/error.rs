//! Error handling for tinyg-config
//!
//! Provides error types for all layers of the tool:
//! - Codec errors (malformed text dumps or JSON documents)
//! - Protocol errors (timeouts and partial writes while talking to the device)
//! - Connection errors (the channel could not be opened or broke)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Codec error type
///
/// Raised while turning a text dump or JSON document into a configuration
/// store. Every variant counts as malformed input: the parse that produced it
/// is aborted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input could not be interpreted
    #[error("Malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// Invalid JSON document
    #[error("Invalid JSON at line {line}, column {column}: {reason}")]
    InvalidJson {
        /// The line of the offending token.
        line: usize,
        /// The column of the offending token.
        column: usize,
        /// The parser's description of the problem.
        reason: String,
    },

    /// A bracketed text key that maps to no known group
    #[error("Unknown setting '{flat_key}' at line {line_number}")]
    UnknownFlatKey {
        /// The key found between the brackets.
        flat_key: String,
        /// The 1-based input line.
        line_number: usize,
    },

    /// A setting line carries no value token
    #[error("No value for setting '{flat_key}' at line {line_number}")]
    MissingValue {
        /// The key found between the brackets.
        flat_key: String,
        /// The 1-based input line.
        line_number: usize,
    },

    /// A value of a kind the store cannot hold
    #[error("Unsupported value for {group}.{key}: {found}")]
    UnsupportedValue {
        /// Group the value was found in.
        group: String,
        /// Field key of the value.
        key: String,
        /// Rendering of the rejected JSON value.
        found: String,
    },
}

impl CodecError {
    /// Create a malformed input error from a message
    pub fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedInput {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::InvalidJson {
            line: err.line(),
            column: err.column(),
            reason: err.to_string(),
        }
    }
}

/// Protocol error type
///
/// Raised by the request/response exchange with the controller. Both
/// variants are recoverable: the affected group is reported and the
/// remaining groups are still processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// No reply arrived before the read deadline
    #[error("No response for group '{group}' within {timeout_ms}ms")]
    Timeout {
        /// The group being requested or written.
        group: String,
        /// The read timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A later chunk of a group write was not acknowledged
    #[error("Write of group '{group}' failed after {chunks_written} of {chunks_total} chunks")]
    PartialWriteFailure {
        /// The group being written.
        group: String,
        /// Chunks acknowledged before the failure.
        chunks_written: usize,
        /// Chunks the group was split into.
        chunks_total: usize,
    },

    /// A single field does not fit the command line budget
    #[error("Command for group '{group}' is {length} bytes, over the {limit} byte line limit")]
    LineTooLong {
        /// The group being written.
        group: String,
        /// Length of the smallest command that could be built.
        length: usize,
        /// Line limit including the trailing newline.
        limit: usize,
    },
}

/// Connection error type
///
/// Represents failures of the line channel itself. Opening errors are
/// fatal: nothing is exchanged with the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },

    /// I/O error on an open channel
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Main error type for tinyg-config
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Codec error
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl Error {
    /// Check if this is a reply timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Protocol(ProtocolError::Timeout { .. }))
    }

    /// Check if this is a partially written group
    pub fn is_partial_write(&self) -> bool {
        matches!(
            self,
            Error::Protocol(ProtocolError::PartialWriteFailure { .. })
        )
    }

    /// Check if this is malformed text or JSON
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Codec(err.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::Timeout {
            group: "x".to_string(),
            timeout_ms: 1000,
        };
        assert_eq!(err.to_string(), "No response for group 'x' within 1000ms");

        let err = ProtocolError::PartialWriteFailure {
            group: "sys".to_string(),
            chunks_written: 1,
            chunks_total: 3,
        };
        assert_eq!(
            err.to_string(),
            "Write of group 'sys' failed after 1 of 3 chunks"
        );
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ProtocolError::Timeout {
            group: "1".to_string(),
            timeout_ms: 5,
        }
        .into();
        assert!(err.is_timeout());
        assert!(!err.is_connection_error());

        let err: Error = CodecError::malformed("bad").into();
        assert!(err.is_malformed_input());

        let err: Error = ConnectionError::FailedToOpen {
            port: "/dev/ttyUSB0".to_string(),
            reason: "busy".to_string(),
        }
        .into();
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "Failed to open port /dev/ttyUSB0: busy");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\"x\":").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Codec(CodecError::InvalidJson { .. })));
    }
}
