//! Client facade
//!
//! High-level entry point over the host services of the adb server.
//!
//! ```no_run
//! use adblink::Adb;
//!
//! let client = Adb::new();
//! let devices = client.list_devices()?;
//! # Ok::<(), adblink::AdbError>(())
//! ```

use std::time::Duration;

use crate::config::ServerConfig;
use crate::device::{
    parse_device_list_long, parse_device_list_short, DeviceDescriptor, DeviceInfo,
};
use crate::error::{AdbError, Result, ResultExt};
use crate::network::{Connection, Server};
use crate::watcher::DeviceWatcher;

/// Default poll interval for watchers created through the client
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(750);

/// Client for the host services of one adb server.
///
/// Stateless beyond its immutable `Server` handle; every operation dials
/// its own connection, so one client may be used from many threads.
#[derive(Clone, Debug)]
pub struct Adb {
    server: Server,
}

impl Adb {
    /// Create a client with the default server config (127.0.0.1:5037)
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a client for the given server config
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            server: Server::new(config),
        }
    }

    /// Create a client over an existing server handle
    pub fn with_server(server: Server) -> Self {
        Self { server }
    }

    /// The underlying server handle
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Open a raw connection to the server
    pub fn dial(&self) -> Result<Connection> {
        self.server.dial()
    }

    /// Start the adb server if it is not running
    pub fn start_server(&self) -> Result<()> {
        self.server.start().operation("StartServer")
    }

    /// Ask the server for its internal version number.
    ///
    /// Corresponds to `adb version`; the payload is a hex ASCII integer.
    pub fn server_version(&self) -> Result<u32> {
        let payload = self
            .server
            .round_trip_single_response("host:version")
            .operation("ServerVersion")?;
        parse_server_version(&payload).operation("ServerVersion")
    }

    /// Tell the server to quit immediately.
    ///
    /// Corresponds to `adb kill-server`. The server tears the connection
    /// down as it exits, so no status is read back.
    pub fn kill_server(&self) -> Result<()> {
        let run = || -> Result<()> {
            let mut conn = self.server.dial()?;
            conn.send_message_str("host:kill")?;
            conn.close()
        };
        run().operation("KillServer")
    }

    /// List the serial numbers of all attached devices.
    ///
    /// Corresponds to `adb devices`.
    pub fn list_device_serials(&self) -> Result<Vec<String>> {
        let payload = self
            .server
            .round_trip_single_response("host:devices")
            .operation("ListDeviceSerials")?;
        let devices = parse_device_list_short(&String::from_utf8_lossy(&payload))
            .operation("ListDeviceSerials")?;
        Ok(devices.into_iter().map(|d| d.serial).collect())
    }

    /// List all attached devices with state and attributes.
    ///
    /// Corresponds to `adb devices -l`.
    pub fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let payload = self
            .server
            .round_trip_single_response("host:devices-l")
            .operation("ListDevices")?;
        parse_device_list_long(&String::from_utf8_lossy(&payload)).operation("ListDevices")
    }

    /// Connect to a device over TCP/IP.
    ///
    /// Corresponds to `adb connect`.
    pub fn connect(&self, host: &str, port: u16) -> Result<()> {
        self.server
            .round_trip_single_response(&format!("host:connect:{}:{}", host, port))
            .operation("Connect")?;
        Ok(())
    }

    /// Restart the device's adbd listening on a TCP port.
    ///
    /// Corresponds to `adb tcpip`. Uses the two-step transport-selection
    /// protocol: the `host:tport` request scopes the following action
    /// command to the device, on the same connection.
    pub fn restart_tcpip(&self, serial: &str, device_port: u16) -> Result<()> {
        let descriptor = DeviceDescriptor::Serial(serial.to_string());
        self.device_scoped_command(&descriptor, &format!("tcpip:{}", device_port))
            .operation("RestartTcpip")
    }

    /// Forward a local TCP port to a port on the device.
    ///
    /// Corresponds to `adb forward`.
    pub fn forward_device(&self, serial: &str, local_port: u16, device_port: u16) -> Result<()> {
        let descriptor = DeviceDescriptor::Serial(serial.to_string());
        self.device_scoped_command(
            &descriptor,
            &format!("host:forward:tcp:{};tcp:{}", local_port, device_port),
        )
        .operation("ForwardDevice")
    }

    /// Create a watcher over this client's server, not yet started
    pub fn device_watcher(&self) -> DeviceWatcher {
        self.device_watcher_with_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Create a watcher with an explicit poll interval
    pub fn device_watcher_with_interval(&self, poll_interval: Duration) -> DeviceWatcher {
        DeviceWatcher::new(self.server.clone(), poll_interval)
    }

    /// Send a transport-selection request followed by an action command
    /// on the same connection, reading a status after each.
    fn device_scoped_command(&self, descriptor: &DeviceDescriptor, command: &str) -> Result<()> {
        let mut conn = self.server.dial()?;

        let transport = descriptor.transport_command();
        conn.send_message_str(&transport)?;
        conn.read_status(&transport)?;

        conn.send_message_str(command)?;
        conn.read_status(command)
    }
}

impl Default for Adb {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the `host:version` payload: a hexadecimal ASCII integer
pub fn parse_server_version(payload: &[u8]) -> Result<u32> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| AdbError::Parse(format!("version payload is not UTF-8: {:02x?}", payload)))?;
    u32::from_str_radix(text, 16)
        .map_err(|_| AdbError::Parse(format!("version is not hex: {:?}", text)))
}
