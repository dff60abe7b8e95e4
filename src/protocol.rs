//! Paced field transmission and the single-byte response read.
//!
//! # Wire behavior
//!
//! Each field value goes out as its raw ASCII bytes with no delimiter,
//! length prefix or terminator. The receiver tells fields apart by the
//! pacing gaps (or by fixed expected lengths):
//!
//! ```text
//! wait initial_delay
//! for each field:  write value, flush, wait inter_field_delay
//! read one byte
//! ```
//!
//! The trailing byte is read once per session. It is not correlated to any
//! particular field.

use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::error::{Result, SessionError};
use crate::fields::FieldCollection;
use crate::session::Session;
use crate::transport::Link;
use crate::utils::{ascii_bytes, format_bytes};

/// Wait before the first write.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Wait after every write, including the last.
pub const DEFAULT_INTER_FIELD_DELAY: Duration = Duration::from_millis(2000);

/// Delays inserted around writes so the PLC can process each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pacing {
    /// Wait before the first write.
    #[cfg_attr(feature = "serde", serde(with = "crate::config::millis"))]
    pub initial_delay: Duration,
    /// Wait after each write.
    #[cfg_attr(feature = "serde", serde(with = "crate::config::millis"))]
    pub inter_field_delay: Duration,
}

impl Pacing {
    /// Creates a custom pacing.
    pub fn new(initial_delay: Duration, inter_field_delay: Duration) -> Self {
        Self {
            initial_delay,
            inter_field_delay,
        }
    }

    /// Total time spent waiting when sending `field_count` fields.
    pub fn total_for(&self, field_count: usize) -> Duration {
        let per_field = u32::try_from(field_count).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_add(self.inter_field_delay.saturating_mul(per_field))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_DELAY, DEFAULT_INTER_FIELD_DELAY)
    }
}

/// Outcome of a successful response read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// One byte received from the PLC.
    Byte(u8),
    /// The PLC closed the connection before sending anything.
    EndOfStream,
}

impl Response {
    /// Returns the byte, if one was received.
    pub fn byte(self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(b),
            Self::EndOfStream => None,
        }
    }
}

/// Sends field collections over a [`Session`] and reads the reply.
///
/// The transmitter borrows sessions and never closes them.
///
/// # Example
///
/// ```no_run
/// use plc_field_link::{ConnectionParameters, FieldCollection, Session, Transmitter};
///
/// let mut session = Session::connect(&ConnectionParameters::default());
/// let fields = FieldCollection::new().with("A", "1").with("B", "22");
///
/// let transmitter = Transmitter::new();
/// if transmitter.send(&fields, &mut session).is_ok() {
///     let ack = transmitter.receive(&mut session);
///     println!("{ack:?}");
/// }
/// session.disconnect();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transmitter {
    pacing: Pacing,
    cancel: CancelToken,
}

impl Transmitter {
    /// Creates a transmitter with the default pacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Uses the given token to interrupt pacing waits.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the pacing in use.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Returns a handle that interrupts this transmitter's pacing waits.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Writes every field value in order, paced, flushing after each.
    ///
    /// Stops at the first failure; later fields are not attempted.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`] if the session is not connected (no I/O)
    /// - [`SessionError::Encoding`] if any value is not ASCII (no I/O)
    /// - [`SessionError::SendIo`] if a write or flush fails
    /// - [`SessionError::SendInterrupted`] if a pacing wait is cancelled
    pub fn send<L: Link>(&self, fields: &FieldCollection, session: &mut Session<L>) -> Result<()> {
        info!(count = fields.len(), "preparing to send data to PLC");
        for (n, field) in fields.iter().enumerate() {
            debug!("  [{}] {}", n + 1, field);
        }

        let link = session.link_mut().inspect_err(|e| warn!("{e}. Aborting send operation."))?;

        let payloads = fields
            .iter()
            .map(|field| {
                ascii_bytes(&field.value).map_err(|position| SessionError::Encoding {
                    field: field.name.clone(),
                    position,
                })
            })
            .collect::<Result<Vec<&[u8]>>>()
            .inspect_err(|e| warn!("{e}"))?;

        if !self.cancel.sleep(self.pacing.initial_delay) {
            let err = SessionError::SendInterrupted { sent: 0 };
            warn!("{err}");
            return Err(err);
        }

        let total = fields.len();
        for (index, (field, bytes)) in fields.iter().zip(payloads).enumerate() {
            debug!(index, bytes = %format_bytes(bytes), "sending {}", field.name);

            write_field(link, bytes).map_err(|source| {
                let err = SessionError::SendIo {
                    index,
                    field: field.name.clone(),
                    source,
                };
                warn!("{err}");
                err
            })?;

            info!(
                "[{}/{}] Sent: \"{}\" -> {} ({} chars)",
                index + 1,
                total,
                field.value,
                field.name,
                bytes.len()
            );

            if !self.cancel.sleep(self.pacing.inter_field_delay) {
                let err = SessionError::SendInterrupted { sent: index + 1 };
                warn!("{err}");
                return Err(err);
            }
        }

        info!("all data sent successfully");
        Ok(())
    }

    /// Reads exactly one byte, bounded by the session's read deadline.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`] if the session is not connected (no I/O)
    /// - [`SessionError::ReceiveTimeout`] if the read deadline expires
    /// - [`SessionError::ReceiveIo`] for other read failures
    pub fn receive<L: Link>(&self, session: &mut Session<L>) -> Result<Response> {
        let link = session
            .link_mut()
            .inspect_err(|e| warn!("{e}. Nothing to receive from."))?;

        let response = read_one(link).inspect_err(|e| warn!("{e}"))?;
        match response {
            Response::Byte(b) => info!("Received byte: {b}"),
            Response::EndOfStream => info!("Received end of stream"),
        }
        Ok(response)
    }
}

fn write_field<W: Write>(link: &mut W, bytes: &[u8]) -> io::Result<()> {
    link.write_all(bytes)?;
    link.flush()
}

fn read_one<R: Read>(link: &mut R) -> Result<Response> {
    let mut buf = [0u8; 1];
    loop {
        match link.read(&mut buf) {
            Ok(0) => return Ok(Response::EndOfStream),
            Ok(_) => return Ok(Response::Byte(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(SessionError::ReceiveTimeout)
            }
            Err(e) => return Err(SessionError::ReceiveIo(e)),
        }
    }
}
