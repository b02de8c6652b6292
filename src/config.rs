//! Configuration for adblink
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default TCP port of the adb host server
pub const DEFAULT_PORT: u16 = 5037;

/// Configuration for one adb server endpoint.
///
/// Immutable after construction; shared by every operation issued through
/// the same client. Holds no connection state, so concurrent use is safe.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Host the adb server listens on
    pub host: String,

    /// TCP port of the adb server
    pub port: u16,

    // -------------------------------------------------------------------------
    // Server Bootstrap Configuration
    // -------------------------------------------------------------------------
    /// Path to the adb binary, used to start the server on demand
    pub adb_path: PathBuf,

    /// How long `start` waits for a launched server to become reachable
    pub start_timeout: Duration,

    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout for each dialed connection
    pub dial_timeout: Duration,

    /// Read/write deadline applied to each connection; `None` means
    /// block indefinitely
    pub io_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            adb_path: PathBuf::from("adb"),
            start_timeout: Duration::from_secs(10),
            dial_timeout: Duration::from_secs(5),
            io_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// The `host:port` address string this config points at
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the path to the adb binary
    pub fn adb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.adb_path = path.into();
        self
    }

    /// Set how long to wait for a launched server to come up
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.config.start_timeout = timeout;
        self
    }

    /// Set the connect timeout for dialing
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.config.dial_timeout = timeout;
        self
    }

    /// Set the per-connection read/write deadline
    pub fn io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.io_timeout = timeout;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
