//! # PLC Field Link
//!
//! A small client for handing an ordered set of text values to an industrial
//! controller (PLC) over TCP and reading back a single acknowledgement byte.
//!
//! The protocol is deliberately minimal: every value is written as raw ASCII,
//! one write per field, separated only by fixed pacing delays. There is no
//! framing, no checksum and no per-field acknowledgement. The PLC infers
//! field boundaries from the gaps and answers with one byte per session.
//!
//! ## Features
//!
//! - **Never throws** — connect failures yield an unusable [`Session`] with a
//!   classified diagnostic; send/receive return [`Result`]
//! - **Fail fast** — stages check the session state before any I/O
//! - **Deterministic release** — [`Session::disconnect`] is idempotent and
//!   also runs on drop
//! - **Cancellable pacing** — a [`CancelToken`] aborts the remaining fields
//! - **Observable** — progress is reported through [`tracing`] events
//!
//! ## Quick Start
//!
//! ```no_run
//! use plc_field_link::{ConnectionParameters, Session, Transmitter, VehicleAttributes};
//! use std::time::Duration;
//!
//! let params = ConnectionParameters::new("192.168.250.1", 9600, Duration::from_millis(5000));
//! let record = VehicleAttributes {
//!     model: "DUMMY-MODEL-12345".into(),
//!     vin: "DUMMY-VIN-TEST-001".into(),
//!     ..Default::default()
//! };
//!
//! let mut session = Session::connect(&params);
//! let transmitter = Transmitter::new();
//!
//! // Each stage checks the session itself, so the sequence always runs.
//! let sent = transmitter.send(&record.to_fields(), &mut session);
//! let ack = transmitter.receive(&mut session);
//! session.disconnect();
//!
//! println!("sent: {:?}, ack: {:?}", sent.is_ok(), ack.ok());
//! ```
//!
//! ## Error Handling
//!
//! Every failure is a [`SessionError`]; [`SessionError::kind`] gives its
//! [`ErrorKind`].
//!
//! ```no_run
//! use plc_field_link::{ConnectionParameters, ErrorKind, Session};
//!
//! let session = Session::connect(&ConnectionParameters::default());
//! match session.diagnostic().map(|e| e.kind()) {
//!     None => println!("connected"),
//!     Some(ErrorKind::ConnectionRefused) => println!("is the PLC running?"),
//!     Some(ErrorKind::ConnectTimeout) => println!("no answer in time"),
//!     Some(kind) => println!("failed: {kind:?}"),
//! }
//! ```
//!
//! ## Pacing
//!
//! The default [`Pacing`] waits 1000ms before the first write and 2000ms
//! after every write, the last one included. Receivers depend on these gaps.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod cancel;
mod config;
mod error;
mod exchange;
mod fields;
mod protocol;
mod session;
mod transport;
pub mod utils;

// Public re-exports
pub use cancel::CancelToken;
pub use config::{ConnectionParameters, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use error::{ErrorKind, Result, SessionError};
pub use exchange::{exchange, ExchangeReport};
pub use fields::{Field, FieldCollection, VehicleAttributes, FIELD_PREFIX};
pub use protocol::{
    Pacing, Response, Transmitter, DEFAULT_INITIAL_DELAY, DEFAULT_INTER_FIELD_DELAY,
};
pub use session::{Session, SessionState};
pub use transport::{classify_connect_error, connect_tcp, resolve, Link};
