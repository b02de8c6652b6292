//! Server process launcher
//!
//! External collaborator used by `Server::start` when dialing fails.

use std::process::Command;

use crate::config::ServerConfig;
use crate::error::{AdbError, Result};

/// Launches the adb server process.
///
/// Injected into `Server` so tests can substitute their own launcher and
/// so callers embedding adblink can control how the process is spawned.
pub trait ServerLauncher: Send + Sync {
    /// Start the server described by `config`; return once the launch
    /// attempt itself has completed (reachability is probed by the caller).
    fn start_server(&self, config: &ServerConfig) -> Result<()>;
}

/// Default launcher: runs `adb -P <port> start-server`.
pub struct AdbCommandLauncher;

impl ServerLauncher for AdbCommandLauncher {
    fn start_server(&self, config: &ServerConfig) -> Result<()> {
        let output = Command::new(&config.adb_path)
            .arg("-P")
            .arg(config.port.to_string())
            .arg("start-server")
            .output()
            .map_err(|e| {
                AdbError::ServerUnavailable(format!(
                    "failed to run {}: {}",
                    config.adb_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(AdbError::ServerUnavailable(format!(
                "{} start-server exited with {}: {}",
                config.adb_path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::debug!("launched adb server via {}", config.adb_path.display());
        Ok(())
    }
}
