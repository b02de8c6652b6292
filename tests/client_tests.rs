//! Client Tests
//!
//! End-to-end round trips against an in-process fake adb server speaking
//! the real framing.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use adblink::error::ErrorKind;
use adblink::network::ServerLauncher;
use adblink::{Adb, DeviceState, Result, Server, ServerConfig};

// =============================================================================
// Fake Server Harness
// =============================================================================

/// Spawn a listener that hands its first accepted connection to `session`
fn spawn_fake_server<F>(session: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        session(stream);
    });
    (port, handle)
}

fn client_for(port: u16) -> Adb {
    let config = ServerConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .io_timeout(Some(Duration::from_secs(5)))
        .build();
    Adb::with_config(config)
}

/// Read one framed request and return its text
fn read_request(stream: &mut TcpStream) -> String {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).unwrap();
    let len = usize::from_str_radix(std::str::from_utf8(&header).unwrap(), 16).unwrap();
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).unwrap();
    String::from_utf8(payload).unwrap()
}

fn write_okay(stream: &mut TcpStream) {
    stream.write_all(b"OKAY").unwrap();
}

fn write_okay_payload(stream: &mut TcpStream, payload: &[u8]) {
    stream.write_all(b"OKAY").unwrap();
    stream
        .write_all(format!("{:04x}", payload.len()).as_bytes())
        .unwrap();
    stream.write_all(payload).unwrap();
}

fn write_fail(stream: &mut TcpStream, message: &str) {
    stream.write_all(b"FAIL").unwrap();
    stream
        .write_all(format!("{:04x}", message.len()).as_bytes())
        .unwrap();
    stream.write_all(message.as_bytes()).unwrap();
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_server_version_round_trip() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:version");
        write_okay_payload(&mut stream, b"0029");
    });

    let version = client_for(port).server_version().unwrap();
    assert_eq!(version, 41);
    server.join().unwrap();
}

#[test]
fn test_request_framing_on_the_wire() {
    // The request must be the raw command prefixed by a 4-digit
    // lower-case hex length, with no trailing newline
    let (port, server) = spawn_fake_server(|mut stream| {
        let mut raw = [0u8; 16];
        stream.read_exact(&mut raw).unwrap();
        assert_eq!(&raw, b"000chost:version");
        write_okay_payload(&mut stream, b"0029");
    });

    client_for(port).server_version().unwrap();
    server.join().unwrap();
}

#[test]
fn test_list_devices_round_trip() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:devices-l");
        write_okay_payload(
            &mut stream,
            b"emulator-5554\tdevice\tproduct:sdk_gphone64 transport_id:1\nABC123\toffline\n",
        );
    });

    let devices = client_for(port).list_devices().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].serial, "emulator-5554");
    assert_eq!(devices[0].state, DeviceState::Device);
    assert_eq!(devices[0].attribute("transport_id"), Some("1"));
    assert_eq!(devices[1].state, DeviceState::Offline);
    server.join().unwrap();
}

#[test]
fn test_list_device_serials_round_trip() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:devices");
        write_okay_payload(&mut stream, b"emulator-5554\tdevice\nABC123\tdevice\n");
    });

    let serials = client_for(port).list_device_serials().unwrap();
    assert_eq!(serials, ["emulator-5554", "ABC123"]);
    server.join().unwrap();
}

#[test]
fn test_kill_server_sends_command_without_reading_payload() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:kill");
        // Server exits; connection just closes
    });

    client_for(port).kill_server().unwrap();
    server.join().unwrap();
}

#[test]
fn test_forward_device_two_step_on_one_connection() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:tport:serial:ABC123");
        write_okay(&mut stream);
        // Same connection carries the action command
        assert_eq!(read_request(&mut stream), "host:forward:tcp:6100;tcp:7100");
        write_okay(&mut stream);
    });

    client_for(port).forward_device("ABC123", 6100, 7100).unwrap();
    server.join().unwrap();
}

#[test]
fn test_restart_tcpip_two_step() {
    let (port, server) = spawn_fake_server(|mut stream| {
        assert_eq!(read_request(&mut stream), "host:tport:serial:ABC123");
        write_okay(&mut stream);
        assert_eq!(read_request(&mut stream), "tcpip:5555");
        write_okay(&mut stream);
    });

    client_for(port).restart_tcpip("ABC123", 5555).unwrap();
    server.join().unwrap();
}

// =============================================================================
// Failure Paths
// =============================================================================

#[test]
fn test_server_fail_message_is_verbatim() {
    let (port, server) = spawn_fake_server(|mut stream| {
        read_request(&mut stream);
        write_fail(&mut stream, "device 'ABC123' not found");
    });

    let err = client_for(port).list_devices().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerFailure);
    assert_eq!(err.server_message(), Some("device 'ABC123' not found"));
    // Annotated with the operation that failed
    assert!(err.to_string().starts_with("ListDevices"));
    server.join().unwrap();
}

#[test]
fn test_unexpected_status_tag_fails_connection() {
    let (port, server) = spawn_fake_server(|mut stream| {
        read_request(&mut stream);
        stream.write_all(b"HUH?").unwrap();
    });

    let err = client_for(port).server_version().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    server.join().unwrap();
}

#[test]
fn test_non_hex_payload_header_is_protocol_error() {
    let (port, server) = spawn_fake_server(|mut stream| {
        read_request(&mut stream);
        stream.write_all(b"OKAY").unwrap();
        stream.write_all(b"zzzz").unwrap();
    });

    let err = client_for(port).server_version().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    server.join().unwrap();
}

#[test]
fn test_dial_nothing_listening_is_connection_refused() {
    // Bind then drop to find a port with no listener
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = client_for(port).list_devices().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
}

// =============================================================================
// Server Bootstrap
// =============================================================================

/// Launcher that brings up a real listener on the configured port
struct ListeningLauncher {
    invoked: Arc<AtomicBool>,
}

impl ServerLauncher for ListeningLauncher {
    fn start_server(&self, config: &ServerConfig) -> Result<()> {
        self.invoked.store(true, Ordering::SeqCst);
        let addr = config.address();
        std::thread::spawn(move || {
            let listener = TcpListener::bind(addr).unwrap();
            // Serve dials until the test ends
            for stream in listener.incoming() {
                drop(stream);
            }
        });
        Ok(())
    }
}

/// Launcher that claims success but starts nothing
struct NoopLauncher;

impl ServerLauncher for NoopLauncher {
    fn start_server(&self, _config: &ServerConfig) -> Result<()> {
        Ok(())
    }
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_start_launches_server_when_unreachable() {
    let invoked = Arc::new(AtomicBool::new(false));
    let config = ServerConfig::builder()
        .host("127.0.0.1")
        .port(free_port())
        .start_timeout(Duration::from_secs(5))
        .build();
    let server = Server::with_launcher(
        config,
        Arc::new(ListeningLauncher {
            invoked: invoked.clone(),
        }),
    );

    server.start().unwrap();
    assert!(invoked.load(Ordering::SeqCst));
}

#[test]
fn test_start_skips_launcher_when_already_running() {
    let (port, server_thread) = spawn_fake_server(|stream| {
        // The liveness probe dials and drops
        drop(stream);
    });

    let invoked = Arc::new(AtomicBool::new(false));
    let config = ServerConfig::builder().host("127.0.0.1").port(port).build();
    let server = Server::with_launcher(
        config,
        Arc::new(ListeningLauncher {
            invoked: invoked.clone(),
        }),
    );

    server.start().unwrap();
    assert!(!invoked.load(Ordering::SeqCst));
    server_thread.join().unwrap();
}

#[test]
fn test_start_times_out_as_server_unavailable() {
    let config = ServerConfig::builder()
        .host("127.0.0.1")
        .port(free_port())
        .start_timeout(Duration::from_millis(300))
        .build();
    let server = Server::with_launcher(config, Arc::new(NoopLauncher));

    let err = server.start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerUnavailable);
}
