//! One complete PLC exchange: connect, send, receive, disconnect.
//!
//! Every stage runs regardless of how the previous one ended. Stages guard
//! their own preconditions, so a failed connect makes send and receive fail
//! fast with [`SessionError::NotConnected`] instead of touching the network.

use tracing::{info, info_span};

use crate::config::ConnectionParameters;
use crate::error::{Result, SessionError};
use crate::fields::FieldCollection;
use crate::protocol::{Response, Transmitter};
use crate::session::Session;

/// What happened at each stage of an exchange.
#[derive(Debug)]
pub struct ExchangeReport {
    /// Connect failure, if any.
    pub connect: Option<SessionError>,
    /// Send outcome.
    pub send: Result<()>,
    /// Receive outcome.
    pub receive: Result<Response>,
    /// Close failure, if any. Observed only.
    pub disconnect: Option<SessionError>,
}

impl ExchangeReport {
    /// Returns `true` if every stage succeeded.
    pub fn is_success(&self) -> bool {
        self.connect.is_none()
            && self.send.is_ok()
            && self.receive.is_ok()
            && self.disconnect.is_none()
    }

    /// Returns the received byte, if any.
    pub fn acknowledgement(&self) -> Option<u8> {
        self.receive.as_ref().ok().and_then(|r| r.byte())
    }
}

/// Runs connect → send → receive → disconnect against `params`.
///
/// # Example
///
/// ```no_run
/// use plc_field_link::{exchange, ConnectionParameters, FieldCollection, Transmitter};
///
/// let fields = FieldCollection::new().with("A", "1");
/// let report = exchange(&ConnectionParameters::default(), &fields, &Transmitter::new());
/// println!("ack = {:?}", report.acknowledgement());
/// ```
pub fn exchange(
    params: &ConnectionParameters,
    fields: &FieldCollection,
    transmitter: &Transmitter,
) -> ExchangeReport {
    let _span = info_span!("exchange", target = %params.target()).entered();

    let mut session = Session::connect(params);
    let connect = session.take_diagnostic();

    let send = transmitter.send(fields, &mut session);
    let receive = transmitter.receive(&mut session);

    session.disconnect();
    let disconnect = session.take_diagnostic();

    info!(
        connected = connect.is_none(),
        sent = send.is_ok(),
        received = receive.is_ok(),
        "exchange finished"
    );

    ExchangeReport {
        connect,
        send,
        receive,
        disconnect,
    }
}
