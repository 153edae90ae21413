//! Protocol constants
//!
//! Opcode values, sentinels and fixed sizes shared by the downlink encoder and
//! the uplink decoder. Values must match the controller firmware exactly.

// ============================================================================
// Opcodes (7 bits, shared by both directions)
// ============================================================================

/// Channel selection for periodic telemetry.
pub const OP_DEVICE_SETUP: u8 = 0x01;
/// Latitude, longitude and timezone used for sunrise/sunset scheduling.
pub const OP_LOCATION_SETUP: u8 = 0x02;
/// Immediate dim level.
pub const OP_LIVE_CONTROL: u8 = 0x04;
/// Periodic telemetry (uplink only).
pub const OP_SENSOR_DATA: u8 = 0x05;
/// Task (schedule program) write or read.
pub const OP_SEND_TASK: u8 = 0x06;
/// Device acknowledgement of a task write.
pub const OP_TASK_RESPONSE: u8 = 0x07;
/// Software reset.
pub const OP_RESET_DEVICE: u8 = 0x08;
/// Clear tasks and location, return to defaults.
pub const OP_CLEAR_ALL: u8 = 0x09;
/// Force a network rejoin.
pub const OP_RESTART_JOIN: u8 = 0x0A;
/// Hardware and software version report.
pub const OP_DEVICE_INFO: u8 = 0x0B;
/// Grouped device settings.
pub const OP_DEVICE_SETTINGS: u8 = 0x0C;

// ============================================================================
// Header layout
// ============================================================================

/// Size of the header present on every message.
pub const HEADER_SIZE: usize = 2;
/// Mask for the opcode bits of the first header byte.
pub const OPCODE_MASK: u8 = 0x7F;
/// Bit position of the message type flag.
pub const TYPE_SHIFT: u8 = 7;

// ============================================================================
// Body sizes
// ============================================================================

/// Encoded size of one time slot.
pub const TIME_SLOT_SIZE: usize = 7;
/// Number of time slots carried by every task record.
pub const TIME_SLOT_COUNT: usize = 4;
/// Encoded size of a task record.
pub const TASK_RECORD_SIZE: usize = 16 + TIME_SLOT_SIZE * TIME_SLOT_COUNT;
/// Body size of a task echo that carries a program index.
pub const INDEXED_TASK_RECORD_SIZE: usize = TASK_RECORD_SIZE + 1;
/// Body size of a task acknowledgement.
pub const TASK_RESPONSE_SIZE: usize = 12;
/// Body size of a device info report.
pub const DEVICE_INFO_SIZE: usize = 7;
/// Body size of a location setup command.
pub const LOCATION_SIZE: usize = 12;
/// Body size of an uplink settings group (including the group id).
pub const UPLINK_SETTINGS_SIZE: usize = 4;
/// Body size of a date/time settings group (including the group id).
pub const DATE_TIME_SETTINGS_SIZE: usize = 8;
/// Sensor data preamble after the header: counter, total length, 6-byte timestamp.
pub const SENSOR_PREAMBLE_SIZE: usize = 8;

// ============================================================================
// Device setup
// ============================================================================

/// Maximum summed channel width the device can report in one uplink.
pub const MAX_CHANNEL_PAYLOAD: usize = 30;
/// Lowest channel id accepted by device setup.
pub const MIN_SELECTABLE_CHANNEL: u32 = 1;
/// Highest channel id accepted by device setup.
pub const MAX_SELECTABLE_CHANNEL: u32 = 20;

// ============================================================================
// Settings groups
// ============================================================================

/// Uplink interval and confirmation behaviour.
pub const SETTINGS_GROUP_UPLINK: u8 = 4;
/// Real-time clock.
pub const SETTINGS_GROUP_DATE_TIME: u8 = 5;

// ============================================================================
// Sentinels
// ============================================================================

/// End date component meaning "never ends".
pub const FOREVER: u8 = 99;
/// Slot hour/minute meaning "relative to sunrise".
pub const SUNRISE: u8 = 61;
/// Slot hour/minute meaning "relative to sunset".
pub const SUNSET: u8 = 62;
/// Base year for all one-byte year fields.
pub const YEAR_BASE: u16 = 2000;

// ============================================================================
// Transport
// ============================================================================

/// LoRaWAN FPort used for controller downlinks.
pub const DEFAULT_F_PORT: u8 = 8;
/// Default network server queue priority.
pub const DEFAULT_PRIORITY: &str = "NORMAL";
