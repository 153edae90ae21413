//! Message header and opcode table.
//!
//! Every message starts with the same two bytes:
//!
//! ```text
//! +------+-----------+-------------+
//! | TYPE | OPCODE    | DATA_LENGTH |
//! | 1bit | 7 bits    | 8 bits      |
//! +------+-----------+-------------+
//! ```
//!
//! `DATA_LENGTH` counts the body bytes that follow. It is informational only;
//! parsers check the bytes they actually receive.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::*;

/// Direction flag carried in the top bit of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// A query ("get").
    Request,
    /// A command ("set") or a device-originated report.
    Response,
}

impl MessageType {
    /// The single-bit wire value.
    pub fn bit(self) -> u8 {
        match self {
            MessageType::Request => 0,
            MessageType::Response => 1,
        }
    }

    /// Build from a wire value. Only the lowest bit is significant.
    pub fn from_bit(bit: u8) -> Self {
        if bit & 0b1 == 0 {
            MessageType::Request
        } else {
            MessageType::Response
        }
    }
}

/// Known operation identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    DeviceSetup,
    LocationSetup,
    LiveControl,
    SensorData,
    SendTask,
    TaskResponse,
    ResetDevice,
    ClearAll,
    RestartJoin,
    DeviceInfo,
    DeviceSettings,
}

impl OpCode {
    /// Every opcode, in wire order.
    pub const ALL: [OpCode; 11] = [
        OpCode::DeviceSetup,
        OpCode::LocationSetup,
        OpCode::LiveControl,
        OpCode::SensorData,
        OpCode::SendTask,
        OpCode::TaskResponse,
        OpCode::ResetDevice,
        OpCode::ClearAll,
        OpCode::RestartJoin,
        OpCode::DeviceInfo,
        OpCode::DeviceSettings,
    ];

    /// The 7-bit wire value.
    pub fn code(self) -> u8 {
        match self {
            OpCode::DeviceSetup => OP_DEVICE_SETUP,
            OpCode::LocationSetup => OP_LOCATION_SETUP,
            OpCode::LiveControl => OP_LIVE_CONTROL,
            OpCode::SensorData => OP_SENSOR_DATA,
            OpCode::SendTask => OP_SEND_TASK,
            OpCode::TaskResponse => OP_TASK_RESPONSE,
            OpCode::ResetDevice => OP_RESET_DEVICE,
            OpCode::ClearAll => OP_CLEAR_ALL,
            OpCode::RestartJoin => OP_RESTART_JOIN,
            OpCode::DeviceInfo => OP_DEVICE_INFO,
            OpCode::DeviceSettings => OP_DEVICE_SETTINGS,
        }
    }

    /// Look up an opcode by wire value.
    pub fn from_code(code: u8) -> Option<Self> {
        OpCode::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::DeviceSetup => "Device Setup",
            OpCode::LocationSetup => "Location Setup",
            OpCode::LiveControl => "Live Control",
            OpCode::SensorData => "Sensor Data",
            OpCode::SendTask => "Send Task",
            OpCode::TaskResponse => "Task Response",
            OpCode::ResetDevice => "Reset Device",
            OpCode::ClearAll => "Clear All",
            OpCode::RestartJoin => "Restart Join",
            OpCode::DeviceInfo => "Device Info",
            OpCode::DeviceSettings => "Device Settings",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

/// A decoded or to-be-encoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Request or response.
    pub message_type: MessageType,
    /// Raw 7-bit opcode. May be a value this crate does not know.
    pub opcode: u8,
    /// Declared body length.
    pub data_length: u8,
}

impl Header {
    /// Build a header. Opcode is masked to 7 bits and the length to 8 bits;
    /// lengths above 255 are truncated, not rejected.
    pub fn new(opcode: u8, message_type: MessageType, data_length: usize) -> Self {
        Header {
            message_type,
            opcode: opcode & OPCODE_MASK,
            data_length: (data_length & 0xFF) as u8,
        }
    }

    /// Encode to the two wire bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        [
            (self.message_type.bit() << TYPE_SHIFT) | (self.opcode & OPCODE_MASK),
            self.data_length,
        ]
    }

    /// Split the first header byte into message type and opcode.
    pub fn split_first_byte(byte0: u8) -> (MessageType, u8) {
        (
            MessageType::from_bit((byte0 >> TYPE_SHIFT) & 0b1),
            byte0 & OPCODE_MASK,
        )
    }

    /// Decode the header at the start of a frame.
    pub fn decode(frame: &[u8]) -> ProtocolResult<Self> {
        ProtocolError::check_len("header", frame, HEADER_SIZE)?;
        let (message_type, opcode) = Header::split_first_byte(frame[0]);
        Ok(Header {
            message_type,
            opcode,
            data_length: frame[1],
        })
    }

    /// The known opcode, if any.
    pub fn op(&self) -> Option<OpCode> {
        OpCode::from_code(self.opcode)
    }
}

/// Encode a header from its parts.
pub fn encode_header(opcode: u8, message_type: MessageType, data_length: usize) -> [u8; HEADER_SIZE] {
    Header::new(opcode, message_type, data_length).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip_all_pairs() {
        for opcode in 0u8..=127 {
            for message_type in [MessageType::Request, MessageType::Response] {
                let bytes = encode_header(opcode, message_type, 7);
                assert_eq!(Header::split_first_byte(bytes[0]), (message_type, opcode));
                let header = Header::decode(&bytes).unwrap();
                assert_eq!(header.opcode, opcode);
                assert_eq!(header.message_type, message_type);
                assert_eq!(header.data_length, 7);
            }
        }
    }

    #[test]
    fn test_header_masks_inputs() {
        // Opcode above 7 bits loses its top bit instead of flipping the type.
        let bytes = encode_header(0x84, MessageType::Request, 300);
        assert_eq!(bytes, [0x04, (300 & 0xFF) as u8]);
    }

    #[test]
    fn test_live_control_header_byte() {
        let bytes = encode_header(OP_LIVE_CONTROL, MessageType::Response, 1);
        assert_eq!(bytes, [0x84, 0x01]);
    }

    #[test]
    fn test_decode_short_header() {
        let err = Header::decode(&[0x8C]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Truncated {
                what: "header",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_opcode_lookup() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_code(op.code()), Some(op));
        }
        assert_eq!(OpCode::from_code(0x03), None);
        assert_eq!(OpCode::from_code(0x7F), None);
        assert_eq!(OpCode::DeviceSettings.to_string(), "Device Settings (0x0C)");
    }
}
