//! Server handle
//!
//! Knows the adb server's address; dials fresh connections and can
//! bootstrap the server process when it is not running.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::error::{AdbError, Result};
use crate::network::connection::Connection;
use crate::network::launcher::{AdbCommandLauncher, ServerLauncher};

/// How often `start` re-probes a freshly launched server
const START_PROBE_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Handle to one adb server endpoint.
///
/// Stateless beyond its immutable configuration: every `dial` yields an
/// independent connection, so concurrent calls need no locking.
#[derive(Clone)]
pub struct Server {
    config: ServerConfig,
    launcher: Arc<dyn ServerLauncher>,
}

impl Server {
    /// Create a server handle with the default process launcher
    pub fn new(config: ServerConfig) -> Self {
        Self::with_launcher(config, Arc::new(AdbCommandLauncher))
    }

    /// Create a server handle with an injected process launcher
    pub fn with_launcher(config: ServerConfig, launcher: Arc<dyn ServerLauncher>) -> Self {
        Self { config, launcher }
    }

    /// The endpoint configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open a new connection to the server.
    ///
    /// Never retries and never starts the server; an unreachable endpoint
    /// fails with `ConnectionRefused`.
    pub fn dial(&self) -> Result<Connection> {
        let addr = self.config.address();
        let socket_addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| AdbError::ServerUnavailable(format!("{} did not resolve", addr)))?;

        let stream = TcpStream::connect_timeout(&socket_addr, self.config.dial_timeout)
            .map_err(|e| AdbError::ConnectionRefused { addr, source: e })?;

        Connection::new(stream, self.config.io_timeout)
    }

    /// Start the adb server if it is not already running.
    ///
    /// Probes with a throwaway dial first; only launches the process when
    /// the probe fails, then waits for the endpoint to become reachable
    /// within the configured start timeout.
    pub fn start(&self) -> Result<()> {
        if self.dial().is_ok() {
            tracing::debug!("adb server already running at {}", self.config.address());
            return Ok(());
        }

        tracing::info!("starting adb server at {}", self.config.address());
        self.launcher.start_server(&self.config)?;

        let deadline = Instant::now() + self.config.start_timeout;
        loop {
            match self.dial() {
                Ok(_conn) => return Ok(()),
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(START_PROBE_INTERVAL);
                }
                Err(_) => {
                    return Err(AdbError::ServerUnavailable(format!(
                        "server at {} not reachable within {:?} of launch",
                        self.config.address(),
                        self.config.start_timeout
                    )));
                }
            }
        }
    }

    /// Issue one command and read its single framed response.
    ///
    /// Dials, sends, reads the status (a `FAIL` becomes the returned
    /// error), reads one payload, and releases the connection. Exactly
    /// one connection per call; no retries.
    pub fn round_trip_single_response(&self, command: &str) -> Result<Vec<u8>> {
        let mut conn = self.dial()?;
        conn.send_message_str(command)?;
        conn.read_status(command)?;
        conn.read_message()
    }

    /// Issue one action command that elicits a status but no payload
    pub fn round_trip_status_only(&self, command: &str) -> Result<()> {
        let mut conn = self.dial()?;
        conn.send_message_str(command)?;
        conn.read_status(command)
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
