//! Protocol Module
//!
//! Defines the wire format spoken with the adb host server.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌────────────────┬─────────────────────────────┐
//! │ Len (4 hex)    │      Command (ASCII)        │
//! └────────────────┴─────────────────────────────┘
//! ```
//! The length header is the command's byte length as 4 lower-case hex
//! digits. Commands carry no trailing newline.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬────────────────┬───────────────────┐
//! │ Tag (4)  │ Len (4 hex)    │      Payload      │
//! └──────────┴────────────────┴───────────────────┘
//! ```
//! The tag is `OKAY` or `FAIL`. On `FAIL` the payload is the server's
//! error message. On `OKAY`, host queries carry one result payload;
//! action commands carry none.

mod codec;
mod status;

pub use codec::{
    decode_length_header, encode_length_header, read_frame, write_frame, LENGTH_HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use status::{Status, STATUS_SIZE};
