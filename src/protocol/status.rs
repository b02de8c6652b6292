//! Status tags
//!
//! The 4-byte `OKAY`/`FAIL` marker preceding every response.

use crate::error::{AdbError, Result};

/// Size of the status tag in bytes
pub const STATUS_SIZE: usize = 4;

/// Response status tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    Fail,
}

impl Status {
    /// The wire serialization of this status
    pub fn code(&self) -> &'static [u8; STATUS_SIZE] {
        match self {
            Status::Okay => b"OKAY",
            Status::Fail => b"FAIL",
        }
    }

    /// Decode a 4-byte wire tag.
    ///
    /// Any tag other than `OKAY`/`FAIL` is a protocol error: the stream is
    /// corrupt or the peer speaks a different protocol version.
    pub fn from_tag(tag: &[u8; STATUS_SIZE]) -> Result<Status> {
        match tag {
            b"OKAY" => Ok(Status::Okay),
            b"FAIL" => Ok(Status::Fail),
            other => Err(AdbError::Protocol(format!(
                "unexpected status tag {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}
