//! Device Module
//!
//! Structured device records and the device-list wire-format parser.

mod info;
mod parser;

pub use info::{DeviceDescriptor, DeviceInfo, DeviceShort, DeviceState};
pub use parser::{parse_device_list_long, parse_device_list_short};
