//! Downlink commands sent to the controller.
//!
//! Every command encodes to header + body. Numeric fields wider than their
//! byte are masked, never rejected; Device Setup is the only command that can
//! fail, and it fails while building the [`ChannelSelection`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::channels::ChannelSelection;
use crate::constants::*;
use crate::error::*;
use crate::header::*;
use crate::task::TaskRecord;
use crate::types::*;

/// Commands that can be queued for a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select the channels reported in Sensor Data.
    DeviceSetup(ChannelSelection),

    /// Set the installation position.
    LocationSetup(Location),

    /// Set the dim level immediately.
    LiveControl {
        /// Level 0-100. Sent as-is.
        dim: u8,
    },

    /// Deploy, update or delete a task.
    SendTask(Box<TaskRecord>),

    /// Ask for the task stored at an index.
    TaskRequest { index: u8 },

    /// Software reset.
    ResetDevice,

    /// Clear tasks and location.
    ClearAll,

    /// Force a network rejoin.
    RestartJoin,

    /// Ask for hardware/software versions.
    DeviceInfoRequest { info_id: u8 },

    /// Write a settings group.
    DeviceSettings(SettingsGroup),

    /// Ask for a settings group.
    DeviceSettingsRequest { group_id: u8 },
}

impl Command {
    /// Validate a channel list and build a Device Setup command.
    pub fn device_setup(channel_ids: &[u32]) -> ProtocolResult<Self> {
        Ok(Command::DeviceSetup(ChannelSelection::new(channel_ids)?))
    }

    /// Live control from a wider integer; values are masked to one byte.
    pub fn live_control(dim: u32) -> Self {
        Command::LiveControl {
            dim: (dim & 0xFF) as u8,
        }
    }

    pub fn location(latitude: f32, longitude: f32, timezone: f32) -> Self {
        Command::LocationSetup(Location {
            latitude,
            longitude,
            timezone,
        })
    }

    pub fn send_task(task: TaskRecord) -> Self {
        Command::SendTask(Box::new(task))
    }

    /// Device info request for the default info id.
    pub fn device_info_request() -> Self {
        Command::DeviceInfoRequest { info_id: 1 }
    }

    /// Get the opcode for this command.
    pub fn opcode(&self) -> OpCode {
        match self {
            Command::DeviceSetup(_) => OpCode::DeviceSetup,
            Command::LocationSetup(_) => OpCode::LocationSetup,
            Command::LiveControl { .. } => OpCode::LiveControl,
            Command::SendTask(_) | Command::TaskRequest { .. } => OpCode::SendTask,
            Command::ResetDevice => OpCode::ResetDevice,
            Command::ClearAll => OpCode::ClearAll,
            Command::RestartJoin => OpCode::RestartJoin,
            Command::DeviceInfoRequest { .. } => OpCode::DeviceInfo,
            Command::DeviceSettings(_) | Command::DeviceSettingsRequest { .. } => {
                OpCode::DeviceSettings
            }
        }
    }

    /// Queries travel as requests, everything else as responses ("set").
    pub fn message_type(&self) -> MessageType {
        match self {
            Command::TaskRequest { .. }
            | Command::DeviceInfoRequest { .. }
            | Command::DeviceSettingsRequest { .. } => MessageType::Request,
            _ => MessageType::Response,
        }
    }

    /// Encode the body (everything after the header).
    fn encode_body(&self) -> Vec<u8> {
        match self {
            Command::DeviceSetup(selection) => selection.ids().to_vec(),

            Command::LocationSetup(location) => {
                let mut buf = Vec::with_capacity(LOCATION_SIZE);
                buf.extend_from_slice(&location.latitude.to_le_bytes());
                buf.extend_from_slice(&location.longitude.to_le_bytes());
                buf.extend_from_slice(&location.timezone.to_le_bytes());
                buf
            }

            Command::LiveControl { dim } => vec![*dim],

            Command::SendTask(task) => task.encode().to_vec(),

            Command::TaskRequest { index } => vec![*index],

            Command::ResetDevice | Command::ClearAll | Command::RestartJoin => Vec::new(),

            Command::DeviceInfoRequest { info_id } => vec![*info_id],

            Command::DeviceSettings(group) => group.encode(),

            Command::DeviceSettingsRequest { group_id } => vec![*group_id],
        }
    }

    /// Encode the command to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let body = self.encode_body();
        let header = encode_header(self.opcode().code(), self.message_type(), body.len());

        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&body);

        debug!(
            opcode = %self.opcode(),
            message_type = ?self.message_type(),
            len = buf.len(),
            "encoded downlink"
        );
        buf
    }

    /// Encode and wrap in the base64 transport envelope.
    pub fn to_base64(&self) -> String {
        encode_base64(&self.encode())
    }
}

/// Encode raw bytes as base64 transport text.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 transport text into raw bytes.
pub fn decode_base64(text: &str) -> ProtocolResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| ProtocolError::InvalidBase64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{SlotBoundary, TimeSlot};

    #[test]
    fn test_live_control() {
        let cmd = Command::live_control(75);
        assert_eq!(cmd.encode(), vec![0x84, 0x01, 0x4B]);
        assert_eq!(cmd.to_base64(), "hAFL");
    }

    #[test]
    fn test_live_control_wraps_instead_of_clamping() {
        assert_eq!(Command::live_control(150).encode()[2], 150);
        assert_eq!(Command::live_control(300).encode()[2], 44);
    }

    #[test]
    fn test_device_setup() {
        let cmd = Command::device_setup(&[3, 1, 2]).unwrap();
        assert_eq!(cmd.encode(), vec![0x81, 0x03, 0x01, 0x02, 0x03]);

        let dup = Command::device_setup(&[3, 1, 1, 2]).unwrap();
        assert_eq!(dup.encode(), cmd.encode());
    }

    #[test]
    fn test_device_setup_length_counts_ids_not_bytes() {
        // Channels 13 and 14 are four bytes wide each, but the body is two id bytes.
        let cmd = Command::device_setup(&[14, 13]).unwrap();
        assert_eq!(cmd.encode(), vec![0x81, 0x02, 13, 14]);
    }

    #[test]
    fn test_device_setup_budget() {
        let err = Command::device_setup(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 14, 18, 19, 20])
            .unwrap_err();
        assert_eq!(err, ProtocolError::PayloadTooLarge { total: 31, max: 30 });
    }

    #[test]
    fn test_header_only_commands() {
        assert_eq!(Command::ResetDevice.encode(), vec![0x88, 0x00]);
        assert_eq!(Command::ClearAll.encode(), vec![0x89, 0x00]);
        assert_eq!(Command::RestartJoin.encode(), vec![0x8A, 0x00]);
    }

    #[test]
    fn test_requests_clear_type_bit() {
        assert_eq!(Command::TaskRequest { index: 3 }.encode(), vec![0x06, 0x01, 0x03]);
        assert_eq!(Command::device_info_request().encode(), vec![0x0B, 0x01, 0x01]);
        assert_eq!(
            Command::DeviceSettingsRequest { group_id: 5 }.encode(),
            vec![0x0C, 0x01, 0x05]
        );
    }

    #[test]
    fn test_location() {
        let bytes = Command::location(41.0082, 28.9784, 3.0).encode();
        assert_eq!(&bytes[..2], &[0x82, 12]);
        assert_eq!(bytes.len(), 14);
        assert_eq!(&bytes[2..6], &41.0082f32.to_le_bytes());
        assert_eq!(&bytes[6..10], &28.9784f32.to_le_bytes());
        assert_eq!(&bytes[10..14], &3.0f32.to_le_bytes());
    }

    #[test]
    fn test_send_task() {
        let task = TaskRecord::default().with_slots(&[TimeSlot::new(
            SlotBoundary::Sunset { offset: 0 },
            SlotBoundary::Sunrise { offset: 0 },
            100,
        )]);
        let bytes = Command::send_task(task.clone()).encode();
        assert_eq!(&bytes[..2], &[0x86, 44]);
        assert_eq!(&bytes[2..], &task.encode());
    }

    #[test]
    fn test_device_settings() {
        let uplink = Command::DeviceSettings(SettingsGroup::Uplink(UplinkSettings {
            uplink_time: 15,
            is_confirmed: true,
            force_rejoin_restart: false,
        }));
        assert_eq!(uplink.encode(), vec![0x8C, 0x04, 0x04, 15, 1, 0]);

        let clock = Command::DeviceSettings(SettingsGroup::DateTime(DateTimeSettings {
            year: 25,
            month: 6,
            day: 15,
            hour: 12,
            minute: 30,
            second: 0,
            day_of_week: 3,
        }));
        assert_eq!(
            clock.encode(),
            vec![0x8C, 0x08, 0x05, 0x19, 0x06, 0x0F, 0x0C, 0x1E, 0x00, 0x03]
        );

        let other = Command::DeviceSettings(SettingsGroup::Other(7));
        assert_eq!(other.encode(), vec![0x8C, 0x01, 0x07]);
    }

    #[test]
    fn test_base64_roundtrip() {
        let text = Command::ResetDevice.to_base64();
        assert_eq!(decode_base64(&text).unwrap(), vec![0x88, 0x00]);
        assert!(matches!(
            decode_base64("not base64!"),
            Err(ProtocolError::InvalidBase64(_))
        ));
    }
}
