//! Error types for adblink
//!
//! Provides a unified error type for all operations. Failures carry the
//! operation name and a machine-matchable kind so callers never have to
//! match on message substrings.

use thiserror::Error;

/// Result type alias using AdbError
pub type Result<T> = std::result::Result<T, AdbError>;

/// Unified error type for adblink operations
#[derive(Debug, Error)]
pub enum AdbError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection refused to adb server at {addr}: {source}")]
    ConnectionRefused {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("adb server unavailable: {0}")]
    ServerUnavailable(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Malformed status tag or length header. Fatal to the current
    /// connection; indicates a version mismatch or stream corruption.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered `FAIL`. Expected and recoverable; the message
    /// is the server's own text, verbatim.
    #[error("server error for {request:?}: {message}")]
    ServerFailure { request: String, message: String },

    // -------------------------------------------------------------------------
    // Parse Errors
    // -------------------------------------------------------------------------
    #[error("parse error: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Operation Context
    // -------------------------------------------------------------------------
    /// A lower-level failure annotated with the client operation that hit it.
    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<AdbError>,
    },
}

/// Machine-matchable failure categories, one per taxonomy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    ConnectionRefused,
    ServerUnavailable,
    Timeout,
    Protocol,
    ServerFailure,
    Parse,
}

impl AdbError {
    /// Wrap this error with the name of the client operation that failed.
    ///
    /// The wrapper annotates; it never changes the kind.
    pub fn context(self, operation: &'static str) -> AdbError {
        AdbError::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The failure category, seen through any operation-context wrapper.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdbError::Io(_) => ErrorKind::Io,
            AdbError::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            AdbError::ServerUnavailable(_) => ErrorKind::ServerUnavailable,
            AdbError::Timeout(_) => ErrorKind::Timeout,
            AdbError::Protocol(_) => ErrorKind::Protocol,
            AdbError::ServerFailure { .. } => ErrorKind::ServerFailure,
            AdbError::Parse(_) => ErrorKind::Parse,
            AdbError::Operation { source, .. } => source.kind(),
        }
    }

    /// The server's verbatim `FAIL` message, if this is a server failure.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AdbError::ServerFailure { message, .. } => Some(message),
            AdbError::Operation { source, .. } => source.server_message(),
            _ => None,
        }
    }
}

/// Extension for annotating results with an operation name.
pub trait ResultExt<T> {
    /// Attach the calling operation's name to any error.
    fn operation(self, name: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn operation(self, name: &'static str) -> Result<T> {
        self.map_err(|e| e.context(name))
    }
}
