//! Command implementations. Each returns the text to print.

use std::path::Path;

use chrono::{DateTime, Local};
use lccb_protocol::{
    decode_base64, ChannelSelection, Command, DateTimeSettings, DecodeOptions, DownlinkEnvelope,
    Header, MessageType, SensorData, SettingsGroup, TaskRecord, Uplink, UplinkSettings, CHANNELS,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Action, Cli, EncodeTarget};
use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Run the parsed command line.
pub fn run(cli: &Cli) -> CliResult<String> {
    let config = Config::load(cli.config.as_deref())?;
    match &cli.action {
        Action::Encode { envelope, target } => {
            let command = build_command(target)?;
            encode(&command, *envelope, &config)
        }
        Action::Decode { payload, channels } => decode(payload, channels, &config.decode),
        Action::Channels => Ok(serde_json::to_string_pretty(&CHANNELS[..])?),
    }
}

// ============================================================================
// Encode
// ============================================================================

fn build_command(target: &EncodeTarget) -> CliResult<Command> {
    let command = match target {
        EncodeTarget::Reset => Command::ResetDevice,
        EncodeTarget::Clear => Command::ClearAll,
        EncodeTarget::Rejoin => Command::RestartJoin,
        EncodeTarget::Live { dim } => {
            if *dim > 100 {
                warn!(dim, "dim level above 100 is sent masked to one byte");
            }
            Command::live_control(*dim)
        }
        EncodeTarget::Setup { channels } => Command::device_setup(channels)?,
        EncodeTarget::Location { lat, lon, tz } => Command::location(*lat, *lon, *tz),
        EncodeTarget::Task { file } => Command::send_task(load_task(file)?),
        EncodeTarget::TaskRequest { index } => Command::TaskRequest { index: *index },
        EncodeTarget::InfoRequest { id } => Command::DeviceInfoRequest { info_id: *id },
        EncodeTarget::UplinkSettings {
            uplink_time,
            confirmed,
            force_rejoin,
        } => Command::DeviceSettings(SettingsGroup::Uplink(UplinkSettings {
            uplink_time: *uplink_time,
            is_confirmed: *confirmed,
            force_rejoin_restart: *force_rejoin,
        })),
        EncodeTarget::DateTime { at } => {
            Command::DeviceSettings(SettingsGroup::DateTime(clock_settings(at.as_deref())?))
        }
        EncodeTarget::Settings { group } => {
            Command::DeviceSettings(SettingsGroup::from_group_id(*group))
        }
        EncodeTarget::SettingsRequest { group } => {
            Command::DeviceSettingsRequest { group_id: *group }
        }
    };
    Ok(command)
}

fn encode(command: &Command, envelope: bool, config: &Config) -> CliResult<String> {
    info!(opcode = %command.opcode(), "encoding downlink");
    if !envelope {
        return Ok(command.to_base64());
    }
    let mut body = DownlinkEnvelope::default();
    body.push(command, config.downlink.f_port, &config.downlink.priority);
    Ok(serde_json::to_string(&body)?)
}

/// Task files ending in `.yaml`/`.yml` are YAML, anything else JSON.
fn load_task(path: &Path) -> CliResult<TaskRecord> {
    let text = std::fs::read_to_string(path)?;
    let yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

fn clock_settings(at: Option<&str>) -> CliResult<DateTimeSettings> {
    let wall_clock = match at {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map_err(|source| CliError::Timestamp {
                input: text.to_string(),
                source,
            })?
            .naive_local(),
        None => Local::now().naive_local(),
    };
    Ok(DateTimeSettings::from_datetime(&wall_clock))
}

// ============================================================================
// Decode
// ============================================================================

#[derive(Serialize)]
struct DecodeOutput<'a> {
    opcode: u8,
    opcode_name: Option<&'static str>,
    message_type: MessageType,
    data_length: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    uplink: Option<&'a Uplink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor_data: Option<SensorData>,
}

fn decode(payload: &str, channels: &[u32], opts: &DecodeOptions) -> CliResult<String> {
    let frame = decode_base64(payload)?;
    let header = Header::decode(&frame)?;
    let uplink = Uplink::decode(&frame, opts)?;

    let sensor_data = match &uplink {
        Some(Uplink::SensorData { frame }) if !channels.is_empty() => {
            let selection = ChannelSelection::new(channels)?;
            Some(SensorData::decode(frame, &selection)?)
        }
        _ => None,
    };

    let output = DecodeOutput {
        opcode: header.opcode,
        opcode_name: header.op().map(|op| op.name()),
        message_type: header.message_type,
        data_length: header.data_length,
        message: uplink.as_ref().and_then(Uplink::message),
        uplink: uplink.as_ref(),
        sensor_data,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run_args(args: &[&str]) -> CliResult<String> {
        run(&Cli::parse_from(args))
    }

    #[test]
    fn test_encode_live() {
        assert_eq!(run_args(&["lccb", "encode", "live", "--dim", "75"]).unwrap(), "hAFL");
    }

    #[test]
    fn test_encode_envelope() {
        let out = run_args(&["lccb", "encode", "--envelope", "reset"]).unwrap();
        assert_eq!(
            out,
            r#"{"downlinks":[{"f_port":8,"frm_payload":"iAA=","priority":"NORMAL"}]}"#
        );
    }

    #[test]
    fn test_encode_setup_over_budget() {
        let err = run_args(&[
            "lccb", "encode", "setup", "--channels", "1,2,3,4,5,6,7,8,9,10,11,13,14,18,19,20",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("31 bytes"));
    }

    #[test]
    fn test_clock_from_rfc3339() {
        let settings = clock_settings(Some("2025-06-18T12:30:00+03:00")).unwrap();
        assert_eq!(settings.year, 25);
        assert_eq!(settings.hour, 12);
        assert_eq!(settings.day_of_week, 3);
        assert!(matches!(
            clock_settings(Some("yesterday")),
            Err(CliError::Timestamp { .. })
        ));
    }

    #[test]
    fn test_decode_date_time() {
        let out = run_args(&["lccb", "decode", "jAgFGQYPDB4AAw=="]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["opcode_name"], "Device Settings");
        assert_eq!(json["uplink"]["kind"], "device_settings");
        assert_eq!(json["uplink"]["date_time"]["day_name"], "Çarşamba");
    }

    #[test]
    fn test_decode_unrecognized_is_not_error() {
        // [0x84, 0x01, 0x4B] is a downlink.
        let out = run_args(&["lccb", "decode", "hAFL"]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(json["uplink"].is_null());
        assert_eq!(json["opcode"], 4);
    }

    #[test]
    fn test_decode_sensor_data_with_channels() {
        // header, counter 1, length 3, 2025-06-15 12:30:00, channels 1-3.
        let frame = [0x85, 11, 1, 3, 25, 6, 15, 12, 30, 0, 50, 2, 4];
        let text = lccb_protocol::encode_base64(&frame);
        let out = run_args(&["lccb", "decode", &text, "--channels", "1,2,3"]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["sensor_data"]["readings"][0]["raw"], 50);
        assert_eq!(json["sensor_data"]["timestamp"]["year"], 2025);
    }

    #[test]
    fn test_channels_catalog() {
        let out = run_args(&["lccb", "channels"]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 23);
        assert_eq!(json[4]["scale"], 0.1);
    }
}
