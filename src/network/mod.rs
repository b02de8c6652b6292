//! Network Module
//!
//! Dialing, connections, and server bootstrap.
//!
//! ## Architecture
//! - `Server` holds the immutable endpoint config and dials fresh connections
//! - `Connection` owns exactly one socket and speaks the framed protocol
//! - `ServerLauncher` is the external collaborator that starts the adb
//!   server process when dialing fails

mod connection;
mod launcher;
mod server;

pub use connection::Connection;
pub use launcher::{AdbCommandLauncher, ServerLauncher};
pub use server::Server;
