//! Frame codec
//!
//! Encoding and decoding of length-prefixed frames.
//!
//! ## Frame Format
//! ```text
//! ┌────────────────┬─────────────────────────────┐
//! │ Len (4 hex)    │         Payload             │
//! └────────────────┴─────────────────────────────┘
//! ```
//!
//! The header is the payload length in bytes as exactly 4 hex digits,
//! written lower-case, accepted case-insensitively. A single frame can
//! therefore carry at most 0xFFFF bytes.

use std::io::{Read, Write};

use crate::error::{AdbError, Result};

/// Size of the length header: 4 hex digits
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Maximum payload size representable in one frame
pub const MAX_PAYLOAD_SIZE: usize = 0xFFFF;

/// Encode a payload length as a 4-digit lower-case hex header
pub fn encode_length_header(len: usize) -> Result<[u8; LENGTH_HEADER_SIZE]> {
    if len > MAX_PAYLOAD_SIZE {
        return Err(AdbError::Protocol(format!(
            "payload too large for one frame: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut header = [0u8; LENGTH_HEADER_SIZE];
    let text = format!("{:04x}", len);
    header.copy_from_slice(text.as_bytes());
    Ok(header)
}

/// Decode a 4-digit hex length header, case-insensitively
pub fn decode_length_header(header: &[u8; LENGTH_HEADER_SIZE]) -> Result<usize> {
    let text = std::str::from_utf8(header).map_err(|_| {
        AdbError::Protocol(format!("length header is not ASCII: {:02x?}", header))
    })?;

    usize::from_str_radix(text, 16).map_err(|_| {
        AdbError::Protocol(format!("length header is not hex: {:?}", text))
    })
}

/// Write one frame: length header followed by the raw payload
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let header = encode_length_header(payload.len())?;
    writer.write_all(&header)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame: length header followed by exactly that many bytes
///
/// Blocks until the full frame arrives or the stream fails. A non-hex
/// header fails immediately rather than waiting for more input.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; LENGTH_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = decode_length_header(&header)?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok(payload)
}
