//! Connection Handler
//!
//! One framed connection to the adb server.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{AdbError, Result};
use crate::protocol::{read_frame, write_frame, Status, STATUS_SIZE};

/// One connection to the adb server.
///
/// Owns exactly one socket; not shared across threads. Whichever call
/// dialed it holds it by value, so the socket is released on every exit
/// path when the value drops. Fatal protocol errors leave the stream in
/// an unknown state; the connection must be discarded after one.
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Wrap a connected stream.
    ///
    /// Sets up buffered I/O and applies the read/write deadline.
    pub fn new(stream: TcpStream, io_timeout: Option<Duration>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(io_timeout)?;
        stream.set_write_timeout(io_timeout)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Replace the read/write deadline on the underlying socket
    pub fn set_io_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let stream = self.reader.get_ref();
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one framed message: 4-hex-digit length header + raw bytes
    pub fn send_message(&mut self, payload: &[u8]) -> Result<()> {
        tracing::trace!("sending {} bytes to {}", payload.len(), self.peer_addr);
        write_frame(&mut self.writer, payload).map_err(|e| surface_timeout(e, "message send"))
    }

    /// Send one framed message from a text command
    pub fn send_message_str(&mut self, text: &str) -> Result<()> {
        self.send_message(text.as_bytes())
    }

    /// Read the 4-byte status tag that follows every sent command.
    ///
    /// `OKAY` succeeds. `FAIL` reads the framed error message that follows
    /// and fails with the server's own text, attributed to `request`. Any
    /// other tag is a protocol error and the connection must be discarded.
    pub fn read_status(&mut self, request: &str) -> Result<()> {
        let mut tag = [0u8; STATUS_SIZE];
        self.reader
            .read_exact(&mut tag)
            .map_err(AdbError::from)
            .map_err(|e| surface_timeout(e, "status read"))?;

        match Status::from_tag(&tag)? {
            Status::Okay => Ok(()),
            Status::Fail => {
                let message = self.read_message()?;
                Err(AdbError::ServerFailure {
                    request: request.to_string(),
                    message: String::from_utf8_lossy(&message).into_owned(),
                })
            }
        }
    }

    /// Read one framed message: 4-hex-digit length header + payload
    pub fn read_message(&mut self) -> Result<Vec<u8>> {
        let payload =
            read_frame(&mut self.reader).map_err(|e| surface_timeout(e, "message read"))?;
        tracing::trace!("received {} bytes from {}", payload.len(), self.peer_addr);
        Ok(payload)
    }

    /// Release the underlying socket.
    ///
    /// Dropping the connection has the same effect; this form flushes any
    /// buffered output first and reports the failure if it cannot.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Rewrite deadline expiries as `Timeout` so callers can tell them from
/// other I/O failures.
fn surface_timeout(err: AdbError, what: &str) -> AdbError {
    match err {
        AdbError::Io(ref io_err)
            if matches!(
                io_err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ) =>
        {
            AdbError::Timeout(what.to_string())
        }
        other => other,
    }
}
