//! TCP transport layer for PLC sessions.
//!
//! This module owns everything that touches the operating system socket:
//! name resolution, the bounded connect, deadline setup and failure
//! classification. It knows nothing about fields or pacing.
//!
//! The [`Link`] trait is the seam between a [`Session`](crate::Session) and
//! the byte stream it wraps. [`TcpStream`] is the production link; tests use
//! in-memory links.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::ConnectionParameters;
use crate::error::{Result, SessionError};

/// A connected, bidirectional byte stream to a PLC.
pub trait Link: Read + Write {
    /// Releases the connection.
    ///
    /// Called at most once per session, by the session itself.
    fn close(&mut self) -> io::Result<()>;

    /// Describes the link endpoints for diagnostics.
    fn describe(&self) -> String {
        String::from("link")
    }
}

impl Link for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        // A peer reset leaves nothing to shut down; the fd is released on drop.
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn describe(&self) -> String {
        let local = self
            .local_addr()
            .map_or_else(|_| "?".to_string(), |a| a.to_string());
        let remote = self
            .peer_addr()
            .map_or_else(|_| "?".to_string(), |a| a.to_string());
        format!("{local} -> {remote}")
    }
}

/// Resolves the host of `params` into socket addresses.
///
/// # Errors
///
/// Returns [`SessionError::HostUnreachable`] if resolution fails or yields
/// no address, and [`SessionError::InvalidParameter`] for port 0.
pub fn resolve(params: &ConnectionParameters) -> Result<Vec<SocketAddr>> {
    if params.port == 0 {
        return Err(SessionError::invalid_parameter(
            "port",
            "must be between 1 and 65535",
        ));
    }

    let addrs: Vec<SocketAddr> = (params.host.as_str(), params.port)
        .to_socket_addrs()
        .map_err(|e| SessionError::host_unreachable(&params.host, e.to_string()))?
        .collect();

    if addrs.is_empty() {
        return Err(SessionError::host_unreachable(
            &params.host,
            "no addresses found",
        ));
    }
    Ok(addrs)
}

/// Opens a TCP connection bounded by the configured timeout.
///
/// Every resolved address is tried in order; the last failure is the one
/// reported. On success the read and write deadlines are set to the same
/// timeout so a later receive cannot block forever.
///
/// # Errors
///
/// Returns the classified connect failure (see [`classify_connect_error`]).
pub fn connect_tcp(params: &ConnectionParameters) -> Result<TcpStream> {
    let addrs = resolve(params)?;
    let deadline = params.deadline();
    let target = params.target();

    info!(target = %target, timeout_ms = params.timeout_millis(), "connecting to PLC");

    let started = Instant::now();
    let mut last_error = None;
    for addr in &addrs {
        let attempt = match deadline {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                stream
                    .set_read_timeout(deadline)
                    .and_then(|()| stream.set_write_timeout(deadline))
                    .map_err(|e| classify_connect_error(params, e))?;
                info!(
                    elapsed_ms = started.elapsed().as_millis(),
                    endpoints = %stream.describe(),
                    "connected"
                );
                return Ok(stream);
            }
            Err(e) => {
                debug!(addr = %addr, error = %e, "connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    let error = last_error.unwrap_or_else(|| io::ErrorKind::AddrNotAvailable.into());
    Err(classify_connect_error(params, error))
}

/// Maps an I/O failure during connect onto the session error taxonomy.
pub fn classify_connect_error(params: &ConnectionParameters, error: io::Error) -> SessionError {
    let addr = params.target();
    match error.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable => SessionError::ConnectionRefused {
            addr,
            source: error,
        },
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SessionError::ConnectTimeout {
            addr,
            timeout: params.timeout,
        },
        _ => SessionError::ConnectIo {
            addr,
            source: error,
        },
    }
}
