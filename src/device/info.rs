//! Device records
//!
//! Structured representations of what the server reports about attached
//! devices, plus the descriptor used to select a device on the wire.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Connection state of an attached device.
///
/// The server reports states as free text; strings this client does not
/// recognize map to `Unknown` rather than failing the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Bootloader,
    Recovery,
    Sideload,
    Unknown,
}

impl DeviceState {
    /// Parse a state string from the device-list payload
    pub fn parse(text: &str) -> DeviceState {
        match text {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            "bootloader" => DeviceState::Bootloader,
            "recovery" => DeviceState::Recovery,
            "sideload" => DeviceState::Sideload,
            _ => DeviceState::Unknown,
        }
    }

    /// The canonical state string
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Device => "device",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Bootloader => "bootloader",
            DeviceState::Recovery => "recovery",
            DeviceState::Sideload => "sideload",
            DeviceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One device from the long listing (`host:devices-l`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Serial number; unique key across the device set
    pub serial: String,

    /// Connection state
    pub state: DeviceState,

    /// Extra `key:value` attributes from the long format
    /// (product, model, device, transport_id, ...)
    pub attributes: BTreeMap<String, String>,
}

impl DeviceInfo {
    /// Look up an extra attribute by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// One device from the short listing (`host:devices`); serial only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceShort {
    pub serial: String,
}

/// Selects the device that subsequent commands on a connection apply to.
///
/// Constructed per call; builds the transport-selection command sent
/// before device-scoped action commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceDescriptor {
    /// Whichever single device is attached
    Any,
    /// The single USB-attached device
    Usb,
    /// The single TCP/emulator device
    Local,
    /// The device with this exact serial
    Serial(String),
}

impl DeviceDescriptor {
    /// The `host:tport:` transport-selection command for this descriptor
    pub fn transport_command(&self) -> String {
        match self {
            DeviceDescriptor::Any => "host:tport:any".to_string(),
            DeviceDescriptor::Usb => "host:tport:usb".to_string(),
            DeviceDescriptor::Local => "host:tport:local".to_string(),
            DeviceDescriptor::Serial(serial) => format!("host:tport:serial:{}", serial),
        }
    }

    /// The `host`-service prefix addressing this descriptor directly
    pub fn host_prefix(&self) -> String {
        match self {
            DeviceDescriptor::Any => "host".to_string(),
            DeviceDescriptor::Usb => "host-usb".to_string(),
            DeviceDescriptor::Local => "host-local".to_string(),
            DeviceDescriptor::Serial(serial) => format!("host-serial:{}", serial),
        }
    }
}
