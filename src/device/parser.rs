//! Device-list parser
//!
//! Decodes the textual payloads of `host:devices` (short) and
//! `host:devices-l` (long) into structured records.
//!
//! ## Payload Format
//! Newline-separated records, trailing empty lines ignored. Fields are
//! whitespace-delimited:
//! - Short: `<serial>\t<state>`
//! - Long:  `<serial>\t<state>\t<key>:<value> ...`
//!
//! Parsing is all-or-nothing: one malformed line fails the whole call so
//! device counts are never silently truncated.

use std::collections::BTreeMap;

use crate::device::info::{DeviceInfo, DeviceShort, DeviceState};
use crate::error::{AdbError, Result};

/// Parse the short listing payload; only serials are retained
pub fn parse_device_list_short(payload: &str) -> Result<Vec<DeviceShort>> {
    parse_lines(payload, parse_short_line)
}

/// Parse the long listing payload into full device records
pub fn parse_device_list_long(payload: &str) -> Result<Vec<DeviceInfo>> {
    parse_lines(payload, parse_long_line)
}

fn parse_lines<T>(payload: &str, parse_line: fn(&str) -> Result<T>) -> Result<Vec<T>> {
    payload
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_short_line(line: &str) -> Result<DeviceShort> {
    let mut fields = line.split_whitespace();
    let serial = fields
        .next()
        .ok_or_else(|| malformed_line(line))?;
    // The state field must be present even though it is not retained
    fields.next().ok_or_else(|| malformed_line(line))?;

    Ok(DeviceShort {
        serial: serial.to_string(),
    })
}

fn parse_long_line(line: &str) -> Result<DeviceInfo> {
    let mut fields = line.split_whitespace();
    let serial = fields
        .next()
        .ok_or_else(|| malformed_line(line))?;
    let state = fields
        .next()
        .ok_or_else(|| malformed_line(line))?;

    // Remaining fields are key:value attributes; duplicates last-wins
    let mut attributes = BTreeMap::new();
    for field in fields {
        let (key, value) = field
            .split_once(':')
            .ok_or_else(|| malformed_line(line))?;
        attributes.insert(key.to_string(), value.to_string());
    }

    Ok(DeviceInfo {
        serial: serial.to_string(),
        state: DeviceState::parse(state),
        attributes,
    })
}

fn malformed_line(line: &str) -> AdbError {
    AdbError::Parse(format!("malformed device line: {:?}", line))
}
