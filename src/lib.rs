//! # adblink
//!
//! A client for the ADB host-server protocol with:
//! - Length-prefixed text framing with `OKAY`/`FAIL` status decoding
//! - On-demand server bootstrap when nothing is listening
//! - Structured device-list parsing (short and long formats)
//! - A polling device watcher emitting add/remove change events
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Adb (client)                           │
//! │     version / devices / kill / connect / forward / tcpip     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//! ┌──────────▼──────────┐            ┌──────────▼──────────┐
//! │   DeviceWatcher     │            │   Device parser     │
//! │  (poll/diff/emit)   │            │  (short / long)     │
//! └──────────┬──────────┘            └─────────────────────┘
//!            │
//! ┌──────────▼──────────────────────────────────────────────────┐
//! │                    Server (handle)                           │
//! │          dial / start / round-trip helpers                   │
//! └──────────┬──────────────────────────────────────────────────┘
//!            │ one fresh connection per request
//! ┌──────────▼──────────────────────────────────────────────────┐
//! │                      Connection                              │
//! │      4-hex-digit framed send/receive + status decode         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod client;
pub mod device;
pub mod network;
pub mod protocol;
pub mod watcher;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{parse_server_version, Adb};
pub use config::ServerConfig;
pub use device::{DeviceDescriptor, DeviceInfo, DeviceShort, DeviceState};
pub use error::{AdbError, ErrorKind, Result};
pub use network::{Connection, Server, ServerLauncher};
pub use watcher::{ChangeEvent, DeviceLister, DeviceWatcher};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of adblink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
