//! Telemetry channel catalog.
//!
//! Device Setup selects which of these channels the controller reports in its
//! periodic Sensor Data uplink. The device reads each selected channel in
//! ascending id order at the width listed here, so the table is part of the
//! wire contract.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::error::*;

/// Bus or sensor a channel value originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelProtocol {
    /// Available on both DALI-2 and D4i gear.
    #[serde(rename = "Dali2/D4i")]
    Dali2D4i,
    /// D4i extended data only.
    #[serde(rename = "D4i")]
    D4i,
    /// Controller-side external sensors.
    #[serde(rename = "External")]
    External,
}

/// Wire representation of a channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Unsigned 8-bit.
    Byte,
    /// Unsigned 16-bit little-endian.
    Ushort,
    /// Signed 16-bit little-endian.
    Short,
    /// Signed 32-bit little-endian.
    Int,
}

impl DataType {
    /// Width on the wire.
    pub const fn width(self) -> usize {
        match self {
            DataType::Byte => 1,
            DataType::Ushort | DataType::Short => 2,
            DataType::Int => 4,
        }
    }
}

/// One entry of the channel catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelDescriptor {
    /// Catalog key, 1-23.
    pub channel_id: u8,
    /// Display name.
    pub name: &'static str,
    /// Source bus of the value.
    pub protocol: ChannelProtocol,
    /// Width on the wire in bytes.
    pub byte_length: usize,
    /// How the wire bytes are interpreted.
    pub data_type: DataType,
    /// Channel must always be part of the selection.
    pub forced: bool,
    /// Multiplier turning the raw value into engineering units, when documented.
    pub scale: Option<f64>,
    /// Bit meanings or scaling notes.
    pub detail: Option<&'static str>,
}

const fn channel(
    channel_id: u8,
    name: &'static str,
    protocol: ChannelProtocol,
    data_type: DataType,
    forced: bool,
    scale: Option<f64>,
    detail: Option<&'static str>,
) -> ChannelDescriptor {
    ChannelDescriptor {
        channel_id,
        name,
        protocol,
        byte_length: data_type.width(),
        data_type,
        forced,
        scale,
        detail,
    }
}

use ChannelProtocol::{D4i, Dali2D4i, External};
use DataType::{Byte, Int, Short, Ushort};

/// The full catalog, ordered by channel id.
pub static CHANNELS: [ChannelDescriptor; 23] = [
    channel(1, "Dim Value", Dali2D4i, Byte, true, None, None),
    channel(2, "Device Type", Dali2D4i, Byte, true, None, Some("Dali2: 1, D4i: 2, Unknown: 0")),
    channel(
        3,
        "Status",
        Dali2D4i,
        Byte,
        true,
        None,
        Some(
            "Bit0: Control Gear Failure, Bit1: Lamp Failure, Bit2: Lamp On, Bit3: Limit Error, \
             Bit4: Fade Running, Bit5: Reset State, Bit6: Missing Short Address, \
             Bit7: Power Cycle Seen",
        ),
    ),
    channel(
        4,
        "Fault Summary",
        D4i,
        Ushort,
        false,
        None,
        Some(
            "Bit0: Overall Failure, Bit1: Under Voltage, Bit2: Over Voltage, Bit3: Power Limit, \
             Bit4: Thermal Derating, Bit5: Thermal Shutdown, Bit6: Overall Failure Light Src, \
             Bit7: Short Circuit Light Src, Bit8: Thermal Derating Light Src, \
             Bit9: Thermal Shutdown Light Src",
        ),
    ),
    channel(5, "Supply Voltage", D4i, Ushort, false, Some(0.1), Some("Volts = raw * 0.1")),
    channel(6, "Power Factor", D4i, Byte, false, Some(0.01), Some("Power factor = raw * 0.01")),
    channel(7, "Internal Temp", D4i, Byte, false, None, None),
    channel(8, "Output Current Percent", D4i, Byte, false, None, None),
    channel(9, "Light SRC voltage", D4i, Ushort, false, Some(0.1), Some("Volts = raw * 0.1")),
    channel(
        10,
        "Light SRC current",
        D4i,
        Ushort,
        false,
        Some(0.001),
        Some("Amperes = raw * 0.001"),
    ),
    channel(11, "Light SRC temp", D4i, Byte, false, None, None),
    channel(
        12,
        "ACT PWR SCALE FACTOR",
        D4i,
        Byte,
        false,
        None,
        Some("Exponent for Instant Power: value * 10^raw"),
    ),
    channel(13, "Operating Time", D4i, Int, false, None, None),
    channel(14, "Start Counter", D4i, Int, false, None, None),
    channel(
        15,
        "Short Address",
        Dali2D4i,
        Byte,
        true,
        None,
        Some("DALI sub-device this record belongs to"),
    ),
    channel(16, "Tilt", External, Byte, false, None, None),
    channel(17, "Ldr", External, Ushort, false, None, None),
    channel(18, "External Voltage", External, Short, false, Some(0.1), Some("Volts = raw / 10")),
    channel(
        19,
        "External Current",
        External,
        Short,
        false,
        Some(0.001),
        Some("Amperes = raw / 1000"),
    ),
    channel(
        20,
        "External Active Power",
        External,
        Int,
        false,
        Some(0.01),
        Some("Watts = raw / 100"),
    ),
    channel(
        21,
        "External ReActive Power",
        External,
        Int,
        false,
        Some(0.01),
        Some("VAR = raw / 100"),
    ),
    channel(22, "External Active Energy", External, Int, false, Some(0.1), Some("Wh = raw / 10")),
    channel(
        23,
        "External Power Factor",
        External,
        Byte,
        false,
        Some(0.01),
        Some("Power factor = raw / 100"),
    ),
];

/// Look up a channel by id.
pub fn lookup(channel_id: u8) -> Option<&'static ChannelDescriptor> {
    CHANNELS.iter().find(|ch| ch.channel_id == channel_id)
}

/// Channels that must always be selected.
pub fn forced_channels() -> impl Iterator<Item = &'static ChannelDescriptor> {
    CHANNELS.iter().filter(|ch| ch.forced)
}

/// A validated Device Setup channel list: in range, sorted, unique, and within
/// the sensor data byte budget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u8>")]
pub struct ChannelSelection {
    ids: Vec<u8>,
}

impl ChannelSelection {
    /// Validate a requested channel list.
    ///
    /// Ids outside 1-20 are dropped silently. The rest are sorted and
    /// deduplicated; the selection is rejected when the summed channel widths
    /// exceed [`MAX_CHANNEL_PAYLOAD`].
    pub fn new(requested: &[u32]) -> ProtocolResult<Self> {
        let mut ids: Vec<u8> = requested
            .iter()
            .copied()
            .filter(|id| (MIN_SELECTABLE_CHANNEL..=MAX_SELECTABLE_CHANNEL).contains(id))
            .map(|id| id as u8)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let total: usize = ids
            .iter()
            .filter_map(|id| lookup(*id))
            .map(|ch| ch.byte_length)
            .sum();
        if total > MAX_CHANNEL_PAYLOAD {
            return Err(ProtocolError::PayloadTooLarge {
                total,
                max: MAX_CHANNEL_PAYLOAD,
            });
        }

        debug!(?ids, total, "validated channel selection");
        Ok(ChannelSelection { ids })
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> &[u8] {
        &self.ids
    }

    /// Catalog entries for the selection, in wire order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static ChannelDescriptor> + '_ {
        self.ids.iter().filter_map(|id| lookup(*id))
    }

    /// Bytes the device will use to report the selection.
    pub fn payload_width(&self) -> usize {
        self.descriptors().map(|ch| ch.byte_length).sum()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl TryFrom<Vec<u32>> for ChannelSelection {
    type Error = ProtocolError;

    fn try_from(ids: Vec<u32>) -> Result<Self, Self::Error> {
        ChannelSelection::new(&ids)
    }
}

impl From<ChannelSelection> for Vec<u8> {
    fn from(selection: ChannelSelection) -> Self {
        selection.ids
    }
}
