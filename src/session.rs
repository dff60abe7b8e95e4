//! Session lifecycle: `Unconnected → Connected → Closed`.
//!
//! [`Session::connect`] never fails outright. A failed connect produces an
//! unusable session that carries the classified error as its
//! [`diagnostic`](Session::diagnostic); later stages check
//! [`is_connected`](Session::is_connected) and fail fast on their own.
//!
//! The session is the single owner of its link. [`Session::disconnect`] is
//! the one place the link is released and may be called any number of
//! times; dropping the session releases it too.

use std::fmt;
use std::net::TcpStream;

use tracing::{info, warn};

use crate::config::ConnectionParameters;
use crate::error::{Result, SessionError};
use crate::transport::{connect_tcp, Link};

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable connection (initial, or connect failed).
    Unconnected,
    /// Connected and usable.
    Connected,
    /// Released; terminal.
    Closed,
}

/// One connect-use-disconnect lifecycle over one link.
pub struct Session<L: Link = TcpStream> {
    link: Option<L>,
    state: SessionState,
    diagnostic: Option<SessionError>,
}

impl Session<TcpStream> {
    /// Connects to the PLC described by `params`.
    ///
    /// Always returns a session. On failure it is `Unconnected` and
    /// [`diagnostic`](Self::diagnostic) holds the reason.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use plc_field_link::{ConnectionParameters, Session};
    ///
    /// let mut session = Session::connect(&ConnectionParameters::default());
    /// if let Some(err) = session.diagnostic() {
    ///     eprintln!("{err}");
    /// }
    /// session.disconnect();
    /// ```
    pub fn connect(params: &ConnectionParameters) -> Self {
        match connect_tcp(params) {
            Ok(stream) => Self::from_link(stream),
            Err(err) => {
                warn!(kind = ?err.kind(), "{err}");
                Self::failed(err)
            }
        }
    }
}

impl<L: Link> Session<L> {
    /// Wraps an already-connected link.
    pub fn from_link(link: L) -> Self {
        Self {
            link: Some(link),
            state: SessionState::Connected,
            diagnostic: None,
        }
    }

    /// Creates an unusable session carrying the given diagnostic.
    pub fn failed(diagnostic: SessionError) -> Self {
        Self {
            link: None,
            state: SessionState::Unconnected,
            diagnostic: Some(diagnostic),
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` if the session can be used for send/receive.
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Returns why the session is not usable, if connect failed or the
    /// last disconnect reported a close error.
    pub fn diagnostic(&self) -> Option<&SessionError> {
        self.diagnostic.as_ref()
    }

    /// Takes the diagnostic out of the session, leaving `None`.
    pub fn take_diagnostic(&mut self) -> Option<SessionError> {
        self.diagnostic.take()
    }

    /// Borrows the link of a connected session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] unless the session is connected.
    pub fn link_mut(&mut self) -> Result<&mut L> {
        match (self.state, self.link.as_mut()) {
            (SessionState::Connected, Some(link)) => Ok(link),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Releases the link and moves to `Closed`.
    ///
    /// Idempotent: on a closed or never-connected session this does nothing
    /// besides marking it closed. A failing close is logged and kept as the
    /// diagnostic, never returned.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Closed;
        let Some(mut link) = self.link.take() else {
            return;
        };
        match link.close() {
            Ok(()) => info!("connection closed"),
            Err(e) => {
                let err = SessionError::Disconnect(e);
                warn!(kind = ?err.kind(), "{err}");
                self.diagnostic = Some(err);
            }
        }
    }
}

impl<L: Link> Drop for Session<L> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<L: Link> fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("link", &self.link.as_ref().map(|link| link.describe()))
            .field("diagnostic", &self.diagnostic)
            .finish()
    }
}
