//! LCCB LoRaWAN Payload Codec
//!
//! This crate encodes downlink commands for, and decodes uplinks from, LCCB
//! DALI/D4i lighting controllers. The codec is stateless; every call is a pure
//! function of its input.
//!
//! # Protocol Overview
//!
//! Every message starts with a two-byte header:
//!
//! - **Byte 0**: `TYPE` in the top bit (0 = request/"get", 1 = response/"set")
//!   and a 7-bit opcode
//! - **Byte 1**: body length
//!
//! Downlinks ([`Command`]) are base64-encoded for the network server and can be
//! wrapped in a [`DownlinkEnvelope`]. Uplinks decode to an [`Uplink`]; an unknown
//! opcode/type pair decodes to `None` rather than an error.
//!
//! # Example
//!
//! ```rust
//! use lccb_protocol::{Command, DecodeOptions, Uplink};
//!
//! let cmd = Command::live_control(75);
//! assert_eq!(cmd.to_base64(), "hAFL");
//!
//! let frame = [0x8C, 0x08, 0x05, 0x19, 0x06, 0x0F, 0x0C, 0x1E, 0x00, 0x03];
//! let uplink = Uplink::decode(&frame, &DecodeOptions::default()).unwrap();
//! assert!(matches!(uplink, Some(Uplink::DeviceSettings(_))));
//! ```

mod channels;
mod commands;
mod constants;
mod envelope;
mod error;
mod header;
mod responses;
mod sensor;
mod task;
mod types;

pub use channels::*;
pub use commands::*;
pub use constants::*;
pub use envelope::*;
pub use error::*;
pub use header::*;
pub use responses::*;
pub use sensor::*;
pub use task::*;
pub use types::*;
