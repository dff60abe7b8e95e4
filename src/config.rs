//! Connection parameters for a PLC session.
//!
//! [`ConnectionParameters`] is built once by the caller and handed to
//! [`Session::connect`](crate::Session::connect). There are no process-wide
//! defaults beyond the constants below.

use std::fmt;
use std::time::Duration;

/// Default PLC host (loopback).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default PLC TCP port.
pub const DEFAULT_PORT: u16 = 9600;

/// Default bound for connecting and for the response read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Where and how long to wait when connecting to a PLC.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionParameters {
    /// PLC host name or IP address.
    pub host: String,
    /// PLC TCP port (1-65535).
    pub port: u16,
    /// Connect bound, also applied as the socket's read and write deadline.
    /// Zero means no bound.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub timeout: Duration,
}

impl ConnectionParameters {
    /// Creates connection parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use plc_field_link::ConnectionParameters;
    /// use std::time::Duration;
    ///
    /// let params = ConnectionParameters::new("192.168.250.1", 44818, Duration::from_millis(2000));
    /// assert_eq!(params.target(), "192.168.250.1:44818");
    /// ```
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Sets a custom port (default is 9600).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a custom timeout (default is 5 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use plc_field_link::ConnectionParameters;
    /// use std::time::Duration;
    ///
    /// let params = ConnectionParameters::default().with_timeout(Duration::from_millis(250));
    /// assert_eq!(params.timeout_millis(), 250);
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns `host:port` as used for resolution and diagnostics.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the timeout in whole milliseconds.
    pub fn timeout_millis(&self) -> u128 {
        self.timeout.as_millis()
    }

    /// Returns the timeout as a socket deadline, `None` when unbounded.
    pub(crate) fn deadline(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT)
    }
}

impl fmt::Display for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (timeout {}ms)", self.target(), self.timeout_millis())
    }
}

#[cfg(feature = "serde")]
pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
