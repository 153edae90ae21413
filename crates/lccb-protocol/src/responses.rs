//! Uplink messages received from the controller.
//!
//! [`Uplink::decode`] dispatches on the header's opcode/type pair. A pair this
//! crate does not know decodes to `Ok(None)` so ingestion can log and skip it;
//! a known message with a short body is a [`ProtocolError::Truncated`].

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::commands::decode_base64;
use crate::constants::*;
use crate::error::*;
use crate::header::*;
use crate::task::*;
use crate::types::*;

// ============================================================================
// Report types
// ============================================================================

/// Date stamp on a task acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AckDate {
    /// Full year.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

/// The device's result for a Send Task command. Correlate with the command by
/// `task_profile_id` and `res_code`; the protocol has no request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskAck {
    /// Pass or fail.
    pub res_status: TaskStatus,
    /// Operation the device applied.
    pub res_code: OperationType,
    /// Profile the result belongs to.
    pub task_profile_id: u32,
    /// Channel the task targets.
    pub channel_number: u8,
    /// When the device applied the task.
    pub date: AckDate,
}

impl TaskAck {
    fn decode(body: &[u8]) -> ProtocolResult<Self> {
        ProtocolError::check_len("task response", body, TASK_RESPONSE_SIZE)?;
        Ok(TaskAck {
            res_status: TaskStatus::from(body[0]),
            res_code: OperationType::from(body[1]),
            task_profile_id: u32::from_le_bytes([body[2], body[3], body[4], body[5]]),
            channel_number: body[6],
            date: AckDate {
                year: YEAR_BASE + body[7] as u16,
                month: body[8],
                day: body[9],
                hour: body[10],
                minute: body[11],
            },
        })
    }
}

/// One end-date component: a value, or the "Forever" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndField {
    Forever,
    Value(u16),
}

impl EndField {
    fn from_raw(raw: u8, base: u16) -> Self {
        if raw == FOREVER {
            EndField::Forever
        } else {
            EndField::Value(base + raw as u16)
        }
    }
}

impl Serialize for EndField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EndField::Forever => serializer.serialize_str("Forever"),
            EndField::Value(v) => serializer.serialize_u16(*v),
        }
    }
}

/// Task start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartDate {
    /// Full year.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month.
    pub day: u8,
}

/// End date with each component checked for the sentinel on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndDate {
    /// Full year, or Forever.
    pub year: EndField,
    /// Month, or Forever.
    pub month: EndField,
    /// Day of month, or Forever.
    pub day: EndField,
}

/// A task record echoed back by the device, with display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Storage slot on the device, present when the record answers a Task Request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_index: Option<u8>,
    /// The raw record fields.
    #[serde(flatten)]
    pub record: TaskRecord,
    /// Display name of `operation_type`.
    pub operation_type_name: String,
    /// Display name of `cyclic_type`.
    pub cyclic_type_name: String,
    /// Days whose mask bit is set, i.e. days the task does NOT run.
    pub off_days: Vec<Weekday>,
    /// Start date with the full year.
    pub start_date: StartDate,
    /// End date with sentinels resolved.
    pub end_date: EndDate,
}

impl TaskReport {
    fn decode(data_length: u8, body: &[u8]) -> ProtocolResult<Self> {
        let (program_index, record) = if data_length as usize == INDEXED_TASK_RECORD_SIZE {
            ProtocolError::check_len("task record", body, INDEXED_TASK_RECORD_SIZE)?;
            (Some(body[0]), TaskRecord::decode(&body[1..])?)
        } else {
            (None, TaskRecord::decode(body)?)
        };
        Ok(TaskReport::from_record(program_index, record))
    }

    pub fn from_record(program_index: Option<u8>, record: TaskRecord) -> Self {
        TaskReport {
            program_index,
            operation_type_name: record.operation_type.name().to_string(),
            cyclic_type_name: record.cyclic_type.name().to_string(),
            off_days: Weekday::from_mask(record.off_days_mask),
            start_date: StartDate {
                year: YEAR_BASE + record.start_year as u16,
                month: record.start_month,
                day: record.start_day,
            },
            end_date: EndDate {
                year: EndField::from_raw(record.end_year, YEAR_BASE),
                month: EndField::from_raw(record.end_month, 0),
                day: EndField::from_raw(record.end_day, 0),
            },
            record,
        }
    }
}

/// Hardware and software versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfoReport {
    /// Info block id that was requested.
    pub info_id: u8,
    /// Hardware version, `major.minor.patch`.
    pub hw_version: String,
    /// Firmware version, `major.minor.patch`.
    pub sw_version: String,
}

impl DeviceInfoReport {
    fn decode(body: &[u8]) -> ProtocolResult<Self> {
        ProtocolError::check_len("device info", body, DEVICE_INFO_SIZE)?;
        Ok(DeviceInfoReport {
            info_id: body[0],
            hw_version: format!("{}.{}.{}", body[1], body[2], body[3]),
            sw_version: format!("{}.{}.{}", body[4], body[5], body[6]),
        })
    }
}

/// Device clock as reported in settings group 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTimeReport {
    /// Full year.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    /// Localized name of `day_of_week`.
    pub day_name: String,
}

impl DateTimeReport {
    fn from_settings(s: DateTimeSettings, locale: DayNameLocale) -> Self {
        DateTimeReport {
            year: YEAR_BASE + s.year as u16,
            month: s.month,
            day: s.day,
            hour: s.hour,
            minute: s.minute,
            second: s.second,
            day_of_week: s.day_of_week,
            day_name: locale.day_name(s.day_of_week).to_string(),
        }
    }

    /// The raw settings this report was built from.
    pub fn settings(&self) -> DateTimeSettings {
        DateTimeSettings {
            year: self.year.wrapping_sub(YEAR_BASE) as u8,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            day_of_week: self.day_of_week,
        }
    }

    /// The clock as a chrono value, if it names a real date and time.
    pub fn to_naive(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

/// A settings group report. Groups other than 4 and 5 carry only their id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsReport {
    /// Settings group id.
    pub group_id: u8,
    /// Present for group 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uplink: Option<UplinkSettings>,
    /// Present for group 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTimeReport>,
}

impl SettingsReport {
    fn decode(body: &[u8], opts: &DecodeOptions) -> ProtocolResult<Self> {
        ProtocolError::check_len("device settings", body, 1)?;
        let group_id = body[0];
        let rest = &body[1..];

        let mut report = SettingsReport {
            group_id,
            uplink: None,
            date_time: None,
        };
        match group_id {
            SETTINGS_GROUP_UPLINK => {
                ProtocolError::check_len("uplink settings", rest, UPLINK_SETTINGS_SIZE - 1)?;
                report.uplink = Some(UplinkSettings::from_bytes(rest));
            }
            SETTINGS_GROUP_DATE_TIME => {
                ProtocolError::check_len("date/time settings", rest, DATE_TIME_SETTINGS_SIZE - 1)?;
                let settings = DateTimeSettings::from_bytes(rest);
                report.date_time = Some(DateTimeReport::from_settings(settings, opts.day_names));
            }
            _ => {}
        }
        Ok(report)
    }

    /// Convert back to the group written by Device Settings.
    pub fn to_group(&self) -> SettingsGroup {
        match (&self.uplink, &self.date_time) {
            (Some(uplink), _) => SettingsGroup::Uplink(*uplink),
            (None, Some(date_time)) => SettingsGroup::DateTime(date_time.settings()),
            (None, None) => SettingsGroup::Other(self.group_id),
        }
    }
}

// ============================================================================
// Uplink
// ============================================================================

/// A recognized uplink message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Uplink {
    /// The device asks for its channel configuration.
    DeviceSetupQuery,
    /// The device asks for its location.
    LocationSetupQuery,
    /// Periodic telemetry. The full frame is kept; split it with
    /// [`crate::SensorData::decode`] and the active channel selection.
    SensorData { frame: Vec<u8> },
    /// Result of a Send Task command.
    TaskResponse(TaskAck),
    /// A stored task echoed back.
    TaskRecord(TaskReport),
    DeviceInfo(DeviceInfoReport),
    DeviceSettings(SettingsReport),
}

impl Uplink {
    /// Decode a raw uplink frame.
    pub fn decode(frame: &[u8], opts: &DecodeOptions) -> ProtocolResult<Option<Self>> {
        let header = Header::decode(frame)?;
        let body = &frame[HEADER_SIZE..];

        let uplink = match (header.op(), header.message_type) {
            (Some(OpCode::DeviceSetup), MessageType::Request) => Uplink::DeviceSetupQuery,
            (Some(OpCode::LocationSetup), MessageType::Request) => Uplink::LocationSetupQuery,
            (Some(OpCode::SensorData), MessageType::Response) => Uplink::SensorData {
                frame: frame.to_vec(),
            },
            (Some(OpCode::TaskResponse), MessageType::Response) => {
                Uplink::TaskResponse(TaskAck::decode(body)?)
            }
            (Some(OpCode::SendTask), MessageType::Response) => {
                Uplink::TaskRecord(TaskReport::decode(header.data_length, body)?)
            }
            (Some(OpCode::DeviceInfo), MessageType::Response) => {
                Uplink::DeviceInfo(DeviceInfoReport::decode(body)?)
            }
            (Some(OpCode::DeviceSettings), MessageType::Response) => {
                Uplink::DeviceSettings(SettingsReport::decode(body, opts)?)
            }
            _ => {
                warn!(
                    opcode = header.opcode,
                    message_type = ?header.message_type,
                    "unrecognized uplink"
                );
                return Ok(None);
            }
        };

        debug!(kind = uplink.kind(), len = frame.len(), "decoded uplink");
        Ok(Some(uplink))
    }

    /// Decode base64 transport text.
    pub fn decode_base64(text: &str, opts: &DecodeOptions) -> ProtocolResult<Option<Self>> {
        Uplink::decode(&decode_base64(text)?, opts)
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Uplink::DeviceSetupQuery => OpCode::DeviceSetup,
            Uplink::LocationSetupQuery => OpCode::LocationSetup,
            Uplink::SensorData { .. } => OpCode::SensorData,
            Uplink::TaskResponse(_) => OpCode::TaskResponse,
            Uplink::TaskRecord(_) => OpCode::SendTask,
            Uplink::DeviceInfo(_) => OpCode::DeviceInfo,
            Uplink::DeviceSettings(_) => OpCode::DeviceSettings,
        }
    }

    /// Stable name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Uplink::DeviceSetupQuery => "device_setup_query",
            Uplink::LocationSetupQuery => "location_setup_query",
            Uplink::SensorData { .. } => "sensor_data",
            Uplink::TaskResponse(_) => "task_response",
            Uplink::TaskRecord(_) => "task_record",
            Uplink::DeviceInfo(_) => "device_info",
            Uplink::DeviceSettings(_) => "device_settings",
        }
    }

    /// Short operator-facing summary.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Uplink::DeviceSetupQuery => Some("device setup get message"),
            Uplink::LocationSetupQuery => Some("location setup get message"),
            Uplink::SensorData { .. } => Some(
                "device sent sensor data; channels follow the 10-byte preamble \
                 in ascending id order at their catalog widths",
            ),
            Uplink::TaskResponse(_) => None,
            Uplink::TaskRecord(_) => Some("device sent task record"),
            Uplink::DeviceInfo(_) => Some("device sent info"),
            Uplink::DeviceSettings(_) => Some("device sent settings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    fn decode(bytes: &[u8]) -> ProtocolResult<Option<Uplink>> {
        Uplink::decode(bytes, &DecodeOptions::default())
    }

    #[test]
    fn test_header_only_queries() {
        assert_eq!(decode(&[0x01, 0x00]).unwrap(), Some(Uplink::DeviceSetupQuery));
        assert_eq!(decode(&[0x02, 0x00]).unwrap(), Some(Uplink::LocationSetupQuery));
        let sensor = decode(&[0x85, 0x00]).unwrap().unwrap();
        assert_eq!(sensor.kind(), "sensor_data");
        assert!(sensor.message().is_some());
    }

    #[test]
    fn test_unrecognized_is_none() {
        // Live control is downlink only.
        assert_eq!(decode(&[0x84, 0x01, 0x4B]).unwrap(), None);
        // Device setup as a response is a downlink.
        assert_eq!(decode(&[0x81, 0x01, 0x01]).unwrap(), None);
        assert_eq!(decode(&[0x7F, 0x00]).unwrap(), None);
    }

    #[test]
    fn test_empty_frame_is_error() {
        assert!(decode(&[]).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_task_response() {
        let bytes = [
            0x87, 12, 0, 2, 0x2A, 0x00, 0x00, 0x00, 3, 25, 6, 15, 12, 30,
        ];
        let Some(Uplink::TaskResponse(ack)) = decode(&bytes).unwrap() else {
            panic!("expected task response");
        };
        assert_eq!(ack.res_status, TaskStatus::Pass);
        assert_eq!(ack.res_code, OperationType::Update);
        assert_eq!(ack.task_profile_id, 42);
        assert_eq!(ack.channel_number, 3);
        assert_eq!(
            ack.date,
            AckDate {
                year: 2025,
                month: 6,
                day: 15,
                hour: 12,
                minute: 30
            }
        );
    }

    #[test]
    fn test_task_response_truncated() {
        let err = decode(&[0x87, 12, 0, 2, 0x2A]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Truncated {
                what: "task response",
                expected: 12,
                actual: 3
            }
        );
    }

    #[test]
    fn test_task_record_roundtrip() {
        let record = TaskRecord {
            task_profile_id: 77,
            off_days_mask: 0b000_0011,
            ..TaskRecord::default()
        };
        let bytes = Command::send_task(record.clone()).encode();
        let Some(Uplink::TaskRecord(report)) = decode(&bytes).unwrap() else {
            panic!("expected task record");
        };
        assert_eq!(report.program_index, None);
        assert_eq!(report.record, record);
        assert_eq!(report.operation_type_name, "Deploy");
        assert_eq!(report.cyclic_type_name, "Custom");
        assert_eq!(report.off_days, vec![Weekday::Sunday, Weekday::Monday]);
        assert_eq!(report.end_date.year, EndField::Forever);
        assert_eq!(report.start_date.year, 2000);
    }

    #[test]
    fn test_task_record_with_program_index() {
        let record = TaskRecord::default();
        let mut bytes = vec![0x86, 45, 4];
        bytes.extend_from_slice(&record.encode());
        let Some(Uplink::TaskRecord(report)) = decode(&bytes).unwrap() else {
            panic!("expected task record");
        };
        assert_eq!(report.program_index, Some(4));
        assert_eq!(report.record, record);
    }

    #[test]
    fn test_device_info() {
        let bytes = [0x8B, 7, 1, 1, 2, 3, 4, 5, 6];
        let Some(Uplink::DeviceInfo(info)) = decode(&bytes).unwrap() else {
            panic!("expected device info");
        };
        assert_eq!(info.info_id, 1);
        assert_eq!(info.hw_version, "1.2.3");
        assert_eq!(info.sw_version, "4.5.6");

        assert!(decode(&bytes[..8]).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_device_settings_groups() {
        let Some(Uplink::DeviceSettings(uplink)) =
            decode(&[0x8C, 4, 4, 30, 1, 2]).unwrap()
        else {
            panic!("expected settings");
        };
        assert_eq!(
            uplink.uplink,
            Some(UplinkSettings {
                uplink_time: 30,
                is_confirmed: true,
                force_rejoin_restart: false,
            })
        );

        let Some(Uplink::DeviceSettings(other)) = decode(&[0x8C, 1, 9]).unwrap() else {
            panic!("expected settings");
        };
        assert_eq!(other.group_id, 9);
        assert_eq!(other.to_group(), SettingsGroup::Other(9));
        assert_eq!(
            serde_json::to_value(&other).unwrap(),
            serde_json::json!({"group_id": 9})
        );
    }

    #[test]
    fn test_bare_group_write_decodes() {
        let frame = Command::DeviceSettings(SettingsGroup::Other(4)).encode();
        assert_eq!(frame, vec![0x8C, 0x04, 0x04, 0x00, 0x00, 0x00]);
        let Some(Uplink::DeviceSettings(report)) = decode(&frame).unwrap() else {
            panic!("expected settings");
        };
        assert_eq!(report.uplink, Some(UplinkSettings::default()));

        let frame = Command::DeviceSettings(SettingsGroup::Other(5)).encode();
        assert_eq!(&frame[..3], &[0x8C, 0x08, 0x05]);
        assert!(decode(&frame).unwrap().is_some());
    }

    #[test]
    fn test_device_settings_truncated_group() {
        let err = decode(&[0x8C, 8, 5, 25, 6]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Truncated {
                what: "date/time settings",
                expected: 7,
                actual: 2
            }
        );
        assert!(decode(&[0x8C, 0]).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_day_name_locale() {
        let bytes = [0x8C, 0x08, 0x05, 0x19, 0x06, 0x0F, 0x0C, 0x1E, 0x00, 0x03];
        let opts = DecodeOptions {
            day_names: DayNameLocale::English,
        };
        let Some(Uplink::DeviceSettings(report)) = Uplink::decode(&bytes, &opts).unwrap() else {
            panic!("expected settings");
        };
        assert_eq!(report.date_time.unwrap().day_name, "Wednesday");
    }

    #[test]
    fn test_end_field_json() {
        let end = EndDate {
            year: EndField::Forever,
            month: EndField::Value(12),
            day: EndField::Value(31),
        };
        assert_eq!(
            serde_json::to_value(end).unwrap(),
            serde_json::json!({"year": "Forever", "month": 12, "day": 31})
        );
    }

    #[test]
    fn test_uplink_json_tag() {
        let uplink = decode(&[0x8B, 7, 1, 1, 0, 0, 2, 1, 0]).unwrap().unwrap();
        let json = serde_json::to_value(&uplink).unwrap();
        assert_eq!(json["kind"], "device_info");
        assert_eq!(json["sw_version"], "2.1.0");
    }
}
