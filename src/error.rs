//! Error types for PLC sessions.
//!
//! Every failure a session stage can hit is a [`SessionError`]. None of them
//! are fatal: stages hand them back to the caller, which keeps going with
//! the next stage. [`ErrorKind`] is the cheap, comparable classification.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Classification of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Name/address resolution failed.
    HostUnreachable,
    /// Peer refused the connection or is unreachable at the transport layer.
    ConnectionRefused,
    /// Connect did not complete within the configured bound.
    ConnectTimeout,
    /// Any other transport failure during connect.
    ConnectIo,
    /// Operation attempted on a session that is not connected.
    NotConnected,
    /// A field value cannot be encoded as ASCII.
    Encoding,
    /// A field write failed.
    SendIo,
    /// A pacing wait was cancelled.
    SendInterrupted,
    /// The response read failed.
    ReceiveIo,
    /// The response read hit the read deadline.
    ReceiveTimeout,
    /// Closing the socket failed.
    Disconnect,
    /// Invalid connection parameter.
    InvalidParameter,
}

/// Errors that can occur during a PLC session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The host name could not be resolved.
    #[error("Cannot find PLC at {host}: {reason}")]
    HostUnreachable {
        /// Host as supplied by the caller.
        host: String,
        /// Resolver diagnostic.
        reason: String,
    },

    /// Connection refused or unreachable.
    #[error("Cannot connect to PLC at {addr}: {source} (check the PLC is running, the address is correct and its TCP socket is open)")]
    ConnectionRefused {
        /// Target address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Connect timed out.
    #[error("Connection to {addr} timed out after {}ms", .timeout.as_millis())]
    ConnectTimeout {
        /// Target address.
        addr: String,
        /// Configured bound.
        timeout: Duration,
    },

    /// Other transport failure during connect.
    #[error("Communication with {addr} failed during connect: {source}")]
    ConnectIo {
        /// Target address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No active connection.
    #[error("No active connection to the PLC")]
    NotConnected,

    /// Non-ASCII field value.
    #[error("Field '{field}' is not ASCII: invalid character at byte {position}")]
    Encoding {
        /// Field name.
        field: String,
        /// Byte offset of the first non-ASCII character.
        position: usize,
    },

    /// Writing a field failed; remaining fields were not sent.
    #[error("Failed to send field {index} '{field}': {source}")]
    SendIo {
        /// Zero-based position of the field in the collection.
        index: usize,
        /// Field name.
        field: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Pacing wait was cancelled; remaining fields were not sent.
    #[error("Send interrupted after {sent} field(s)")]
    SendInterrupted {
        /// Number of fields fully written before the interruption.
        sent: usize,
    },

    /// Reading the response failed.
    #[error("Failed to receive data: {0}")]
    ReceiveIo(#[source] io::Error),

    /// Reading the response hit the read deadline.
    #[error("No response within the read deadline")]
    ReceiveTimeout,

    /// Closing the socket failed.
    #[error("Error closing connection: {0}")]
    Disconnect(#[source] io::Error),

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },
}

impl SessionError {
    /// Returns the classification of this error.
    ///
    /// # Example
    ///
    /// ```
    /// use plc_field_link::{ErrorKind, SessionError};
    ///
    /// assert_eq!(SessionError::NotConnected.kind(), ErrorKind::NotConnected);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HostUnreachable { .. } => ErrorKind::HostUnreachable,
            Self::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            Self::ConnectTimeout { .. } => ErrorKind::ConnectTimeout,
            Self::ConnectIo { .. } => ErrorKind::ConnectIo,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::SendIo { .. } => ErrorKind::SendIo,
            Self::SendInterrupted { .. } => ErrorKind::SendInterrupted,
            Self::ReceiveIo(_) => ErrorKind::ReceiveIo,
            Self::ReceiveTimeout => ErrorKind::ReceiveTimeout,
            Self::Disconnect(_) => ErrorKind::Disconnect,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
        }
    }

    /// Creates a new `HostUnreachable` error.
    pub fn host_unreachable(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HostUnreachable {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use plc_field_link::SessionError;
    ///
    /// let err = SessionError::invalid_parameter("port", "must be between 1 and 65535");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
