//! Sensor Data (opcode 0x05) field splitting.
//!
//! The frame carries no channel ids; the layout is fixed by the last Device
//! Setup, so decoding needs the same [`ChannelSelection`].
//!
//! ```text
//! | header (2) | counter (1) | total_length (1) | Y M D h m s (6) | channels... |
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channels::*;
use crate::constants::*;
use crate::error::*;
use crate::header::*;

/// Time the device sampled the channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTime {
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
}

impl SampleTime {
    /// The timestamp as a chrono value, if it names a real date and time.
    pub fn to_naive(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

/// One decoded channel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    /// Catalog channel id.
    pub channel_id: u8,
    /// Catalog channel name.
    pub name: String,
    /// Raw wire value, sign-extended for signed types.
    pub raw: i64,
    /// Raw value times the catalog factor, when one is documented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A field-split Sensor Data uplink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Rolling frame counter.
    pub counter: u8,
    /// Body length as reported by the device.
    pub total_length: u8,
    /// Device clock at sampling time.
    pub timestamp: SampleTime,
    /// One reading per selected channel, ascending id.
    pub readings: Vec<ChannelReading>,
}

impl SensorData {
    /// Split a full Sensor Data frame (header included) using the channel
    /// selection that was active when it was sent.
    pub fn decode(frame: &[u8], selection: &ChannelSelection) -> ProtocolResult<Self> {
        let header = Header::decode(frame)?;
        if header.op() != Some(OpCode::SensorData) || header.message_type != MessageType::Response
        {
            return Err(ProtocolError::UnexpectedMessage {
                expected: "sensor data",
                opcode: header.opcode,
                message_type: header.message_type,
            });
        }

        let expected = HEADER_SIZE + SENSOR_PREAMBLE_SIZE + selection.payload_width();
        ProtocolError::check_len("sensor data", frame, expected)?;

        let p = &frame[HEADER_SIZE..];
        let timestamp = SampleTime {
            year: YEAR_BASE + p[2] as u16,
            month: p[3],
            day: p[4],
            hour: p[5],
            minute: p[6],
            second: p[7],
        };

        let mut offset = HEADER_SIZE + SENSOR_PREAMBLE_SIZE;
        let mut readings = Vec::with_capacity(selection.len());
        for ch in selection.descriptors() {
            let raw = read_value(&frame[offset..offset + ch.byte_length], ch.data_type);
            offset += ch.byte_length;
            readings.push(ChannelReading {
                channel_id: ch.channel_id,
                name: ch.name.to_string(),
                raw,
                value: ch.scale.map(|factor| raw as f64 * factor),
            });
        }

        debug!(counter = p[0], channels = readings.len(), "decoded sensor data");
        Ok(SensorData {
            counter: p[0],
            total_length: p[1],
            timestamp,
            readings,
        })
    }

    /// Reading for a channel, if it was selected.
    pub fn reading(&self, channel_id: u8) -> Option<&ChannelReading> {
        self.readings.iter().find(|r| r.channel_id == channel_id)
    }
}

fn read_value(b: &[u8], data_type: DataType) -> i64 {
    match data_type {
        DataType::Byte => b[0] as i64,
        DataType::Ushort => u16::from_le_bytes([b[0], b[1]]) as i64,
        DataType::Short => i16::from_le_bytes([b[0], b[1]]) as i64,
        DataType::Int => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(selection: &ChannelSelection, values: &[u8]) -> Vec<u8> {
        let mut buf = vec![0x85, (6 + 2 + values.len()) as u8, 7, values.len() as u8];
        buf.extend_from_slice(&[25, 6, 15, 12, 30, 0]);
        buf.extend_from_slice(values);
        assert_eq!(values.len(), selection.payload_width());
        buf
    }

    #[test]
    fn test_decode_forced_channels() {
        let sel = ChannelSelection::new(&[1, 2, 3, 15]).unwrap();
        let data = SensorData::decode(&frame(&sel, &[80, 2, 0b0100, 5]), &sel).unwrap();

        assert_eq!(data.counter, 7);
        assert_eq!(data.timestamp.year, 2025);
        assert_eq!(data.readings.len(), 4);
        assert_eq!(data.reading(1).unwrap().raw, 80);
        assert_eq!(data.reading(15).unwrap().raw, 5);
        assert_eq!(data.reading(1).unwrap().value, None);
        assert!(data.timestamp.to_naive().is_some());
    }

    #[test]
    fn test_decode_scaled_and_signed() {
        // 5: ushort x0.1, 18: short x0.1, 20: int x0.01
        let sel = ChannelSelection::new(&[20, 5, 18]).unwrap();
        let mut values = Vec::new();
        values.extend_from_slice(&2301u16.to_le_bytes());
        values.extend_from_slice(&(-15i16).to_le_bytes());
        values.extend_from_slice(&12345i32.to_le_bytes());
        let data = SensorData::decode(&frame(&sel, &values), &sel).unwrap();

        let voltage = data.reading(5).unwrap();
        assert_eq!(voltage.raw, 2301);
        assert!((voltage.value.unwrap() - 230.1).abs() < 1e-9);

        assert_eq!(data.reading(18).unwrap().raw, -15);
        assert!((data.reading(20).unwrap().value.unwrap() - 123.45).abs() < 1e-9);
    }

    #[test]
    fn test_decode_rejects_other_messages() {
        let sel = ChannelSelection::new(&[1, 2, 3]).unwrap();
        // A padded device info report is long enough but is not telemetry.
        let info = [0x8B, 7, 1, 1, 2, 3, 4, 5, 6, 0, 0, 0, 0];
        let err = SensorData::decode(&info, &sel).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnexpectedMessage {
                expected: "sensor data",
                opcode: 0x0B,
                message_type: MessageType::Response
            }
        );
        assert!(err.is_decode_error());

        // Right opcode, request direction.
        let mut request = frame(&sel, &[1, 2, 3]);
        request[0] = 0x05;
        assert!(matches!(
            SensorData::decode(&request, &sel),
            Err(ProtocolError::UnexpectedMessage { opcode: 0x05, .. })
        ));
    }

    #[test]
    fn test_decode_short_frame() {
        let sel = ChannelSelection::new(&[13]).unwrap();
        let mut bytes = frame(&sel, &[1, 0, 0, 0]);
        bytes.pop();
        let err = SensorData::decode(&bytes, &sel).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Truncated {
                what: "sensor data",
                expected: 14,
                actual: 13
            }
        );
    }
}
