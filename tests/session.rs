//! Session tests against real loopback sockets.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use socket2::SockRef;

use plc_field_link::{
    exchange, ConnectionParameters, ErrorKind, FieldCollection, Pacing, Response, Session,
    SessionState, Transmitter,
};

/// A one-shot PLC stand-in: records every chunk it reads until `expect`
/// bytes arrived, answers with `ack`, then waits for the client to close.
fn spawn_plc(expect: usize, ack: u8) -> (u16, JoinHandle<Vec<(Instant, Vec<u8>)>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(30)))
            .unwrap();

        let mut chunks = Vec::new();
        let mut received = 0;
        let mut buf = [0u8; 64];
        while received < expect {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            received += n;
            chunks.push((Instant::now(), buf[..n].to_vec()));
        }
        stream.write_all(&[ack]).unwrap();

        // drain until the client disconnects
        while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
        chunks
    });

    (port, handle)
}

fn loopback(port: u16, timeout_ms: u64) -> ConnectionParameters {
    ConnectionParameters::new("127.0.0.1", port, Duration::from_millis(timeout_ms))
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_end_to_end_with_default_pacing() {
    let (port, plc) = spawn_plc(3, 0x06);
    let fields: FieldCollection = [("A", "1"), ("B", "22")].into_iter().collect();

    let mut session = Session::connect(&loopback(port, 2000));
    assert_eq!(session.state(), SessionState::Connected);

    let transmitter = Transmitter::new();
    transmitter.send(&fields, &mut session).unwrap();
    assert_eq!(
        transmitter.receive(&mut session).unwrap(),
        Response::Byte(0x06)
    );
    session.disconnect();
    assert_eq!(session.state(), SessionState::Closed);

    let chunks = plc.join().unwrap();
    let payloads: Vec<String> = chunks.iter().map(|(_, bytes)| hex::encode(bytes)).collect();
    assert_eq!(payloads, ["31", "3232"]);
    // read timestamps trail the writes by scheduling jitter
    assert!(chunks[1].0 - chunks[0].0 >= Duration::from_millis(1900));
}

#[test]
fn test_disconnect_is_idempotent_on_live_socket() {
    let (port, plc) = spawn_plc(1, 0x00);
    let mut session = Session::connect(&loopback(port, 1000));
    let transmitter =
        Transmitter::new().with_pacing(Pacing::new(Duration::ZERO, Duration::ZERO));
    transmitter
        .send(&FieldCollection::new().with("A", "Z"), &mut session)
        .unwrap();

    session.disconnect();
    session.disconnect();
    assert!(session.diagnostic().is_none());
    assert_eq!(
        transmitter.receive(&mut session).unwrap_err().kind(),
        ErrorKind::NotConnected
    );
    drop(session);

    let chunks = plc.join().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].1, b"Z");
}

#[test]
fn test_connection_refused() {
    let port = closed_port();
    let mut session = Session::connect(&loopback(port, 1000));

    assert_eq!(session.state(), SessionState::Unconnected);
    assert_eq!(
        session.diagnostic().map(|e| e.kind()),
        Some(ErrorKind::ConnectionRefused)
    );

    let transmitter = Transmitter::new();
    let started = Instant::now();
    assert_eq!(
        transmitter
            .send(&FieldCollection::new().with("A", "1"), &mut session)
            .unwrap_err()
            .kind(),
        ErrorKind::NotConnected
    );
    assert_eq!(
        transmitter.receive(&mut session).unwrap_err().kind(),
        ErrorKind::NotConnected
    );
    assert!(started.elapsed() < Duration::from_millis(500));

    session.disconnect();
    session.disconnect();
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_unresolvable_host() {
    let params = ConnectionParameters::new("plc.invalid", 9600, Duration::from_millis(500));
    let mut session = Session::connect(&params);
    assert_eq!(
        session.diagnostic().map(|e| e.kind()),
        Some(ErrorKind::HostUnreachable)
    );
    session.disconnect();
}

/// Linux drops SYNs once a listener's accept queue is full, so a connect
/// to it stalls until the caller's bound expires.
#[cfg(target_os = "linux")]
#[test]
fn test_connect_timeout_on_full_backlog() {
    use socket2::{Domain, Protocol, Socket, Type};
    use std::net::SocketAddr;

    let listener = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap();
    let bind_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    listener.bind(&bind_addr.into()).unwrap();
    listener.listen(0).unwrap();
    let addr = listener.local_addr().unwrap().as_socket().unwrap();

    // fill the accept queue until a connect stalls
    let mut queued = Vec::new();
    for _ in 0..16 {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
            Ok(stream) => queued.push(stream),
            Err(_) => break,
        }
    }

    let mut session = Session::connect(&loopback(addr.port(), 200));
    assert_eq!(
        session.diagnostic().map(|e| e.kind()),
        Some(ErrorKind::ConnectTimeout)
    );
    assert!(session.diagnostic().unwrap().to_string().contains("200ms"));

    session.disconnect();
    session.disconnect();
    assert_eq!(session.state(), SessionState::Closed);
    drop(queued);
}

#[test]
fn test_disconnect_after_peer_reset_is_clean() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        // zero linger turns the close into a RST
        SockRef::from(&stream)
            .set_linger(Some(Duration::ZERO))
            .unwrap();
        drop(stream);
    });

    let mut session = Session::connect(&loopback(port, 2000));
    peer.join().unwrap();

    // the reset surfaces on the read; its outcome is not the point here
    let _ = Transmitter::new().receive(&mut session);

    session.disconnect();
    assert!(session.diagnostic().is_none());
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_exchange_after_peer_reset_reports_no_disconnect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        SockRef::from(&stream)
            .set_linger(Some(Duration::ZERO))
            .unwrap();
        drop(stream);
    });

    let transmitter = Transmitter::new().with_pacing(Pacing::new(
        Duration::from_millis(200),
        Duration::from_millis(50),
    ));
    let fields = FieldCollection::new().with("A", "1").with("B", "2");
    let report = exchange(&loopback(port, 2000), &fields, &transmitter);
    peer.join().unwrap();

    assert!(report.connect.is_none());
    assert!(report.disconnect.is_none(), "{report:?}");
}

#[test]
fn test_receive_times_out_on_silent_peer() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(600));
        drop(stream);
    });

    let mut session = Session::connect(&loopback(port, 100));
    let err = Transmitter::new().receive(&mut session).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReceiveTimeout);
    assert!(session.is_connected());

    session.disconnect();
    peer.join().unwrap();
}

#[test]
fn test_receive_end_of_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        drop(stream);
    });

    let mut session = Session::connect(&loopback(port, 2000));
    peer.join().unwrap();
    assert_eq!(
        Transmitter::new().receive(&mut session).unwrap(),
        Response::EndOfStream
    );
    session.disconnect();
}

#[test]
fn test_exchange_report() {
    let (port, plc) = spawn_plc(5, 0x06);
    let fields = FieldCollection::new().with("A", "ABC").with("B", "DE");
    let transmitter = Transmitter::new().with_pacing(Pacing::new(
        Duration::from_millis(10),
        Duration::from_millis(50),
    ));

    let report = exchange(&loopback(port, 2000), &fields, &transmitter);
    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.acknowledgement(), Some(0x06));

    let chunks = plc.join().unwrap();
    let wire: Vec<u8> = chunks.into_iter().flat_map(|(_, bytes)| bytes).collect();
    assert_eq!(wire, b"ABCDE");
}

#[test]
fn test_exchange_refused_runs_every_stage() {
    let report = exchange(
        &loopback(closed_port(), 500),
        &FieldCollection::new().with("A", "1"),
        &Transmitter::new(),
    );
    assert_eq!(
        report.connect.as_ref().map(|e| e.kind()),
        Some(ErrorKind::ConnectionRefused)
    );
    assert_eq!(
        report.send.as_ref().unwrap_err().kind(),
        ErrorKind::NotConnected
    );
    assert_eq!(
        report.receive.as_ref().unwrap_err().kind(),
        ErrorKind::NotConnected
    );
    assert!(report.disconnect.is_none());
}

#[test]
fn test_session_wraps_existing_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (mut server, _) = listener.accept().unwrap();

    let mut session = Session::from_link(client);
    server.write_all(&[0x15]).unwrap();
    assert_eq!(
        Transmitter::new().receive(&mut session).unwrap(),
        Response::Byte(0x15)
    );
    session.disconnect();

    let mut buf = [0u8; 1];
    assert_eq!(server.read(&mut buf).unwrap(), 0);
}
