//! Task records: the schedule programs stored on the controller.
//!
//! ## Task record layout (44 bytes)
//!
//! | Field            | Size | Notes                                           |
//! |------------------|------|-------------------------------------------------|
//! | operation_type   | 1    | 1 deploy, 2 update, 3 delete                    |
//! | task_profile_id  | 4    | little-endian, slot key on the device           |
//! | start y/m/d      | 3    | year offset from 2000                           |
//! | end y/m/d        | 3    | 99 in a component means "Forever"              |
//! | priority         | 1    | opaque                                          |
//! | cyclic_type      | 1    | 2 odd, 3 even, 4 interval, 5 custom mask        |
//! | cyclic_time      | 1    | interval in days (cyclic_type 4)                |
//! | off_days_mask    | 1    | bit0 Sunday .. bit6 Saturday, set = day off     |
//! | channel_number   | 1    |                                                 |
//! | time_slots       | 4x7  | always four, unused slots zero-filled           |

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::*;
use crate::error::*;
use crate::types::Weekday;

/// What a task write does to the slot identified by its profile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OperationType {
    Deploy,
    Update,
    Delete,
    /// A code this crate does not know; kept so re-encoding is lossless.
    Unknown(u8),
}

impl OperationType {
    pub fn name(self) -> &'static str {
        match self {
            OperationType::Deploy => "Deploy",
            OperationType::Update => "Update",
            OperationType::Delete => "Delete",
            OperationType::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for OperationType {
    fn from(code: u8) -> Self {
        match code {
            1 => OperationType::Deploy,
            2 => OperationType::Update,
            3 => OperationType::Delete,
            _ => OperationType::Unknown(code),
        }
    }
}

impl From<OperationType> for u8 {
    fn from(op: OperationType) -> Self {
        match op {
            OperationType::Deploy => 1,
            OperationType::Update => 2,
            OperationType::Delete => 3,
            OperationType::Unknown(code) => code,
        }
    }
}

/// Recurrence rule of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CyclicType {
    OddDays,
    EvenDays,
    /// Every `cyclic_time` days.
    Cyclic,
    /// Every day except those set in `off_days_mask`.
    Custom,
    Unknown(u8),
}

impl CyclicType {
    pub fn name(self) -> &'static str {
        match self {
            CyclicType::OddDays => "Odd Days",
            CyclicType::EvenDays => "Even Days",
            CyclicType::Cyclic => "Cyclic",
            CyclicType::Custom => "Custom",
            CyclicType::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for CyclicType {
    fn from(code: u8) -> Self {
        match code {
            2 => CyclicType::OddDays,
            3 => CyclicType::EvenDays,
            4 => CyclicType::Cyclic,
            5 => CyclicType::Custom,
            _ => CyclicType::Unknown(code),
        }
    }
}

impl From<CyclicType> for u8 {
    fn from(cyclic: CyclicType) -> Self {
        match cyclic {
            CyclicType::OddDays => 2,
            CyclicType::EvenDays => 3,
            CyclicType::Cyclic => 4,
            CyclicType::Custom => 5,
            CyclicType::Unknown(code) => code,
        }
    }
}

/// Result flag of a task acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum TaskStatus {
    Pass,
    Fail,
    Unknown(u8),
}

impl From<u8> for TaskStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => TaskStatus::Pass,
            1 => TaskStatus::Fail,
            _ => TaskStatus::Unknown(code),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pass => 0,
            TaskStatus::Fail => 1,
            TaskStatus::Unknown(code) => code,
        }
    }
}

/// One end of a time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBoundary {
    /// Fixed wall-clock time.
    Clock { hour: u8, minute: u8 },
    /// Minutes relative to local sunrise, -60..=60.
    Sunrise { offset: i8 },
    /// Minutes relative to local sunset, -60..=60.
    Sunset { offset: i8 },
}

impl SlotBoundary {
    /// Wire triple `(hour, minute, offset)`.
    pub fn to_wire(self) -> (u8, u8, i8) {
        match self {
            SlotBoundary::Clock { hour, minute } => (hour, minute, 0),
            SlotBoundary::Sunrise { offset } => (SUNRISE, SUNRISE, offset),
            SlotBoundary::Sunset { offset } => (SUNSET, SUNSET, offset),
        }
    }

    /// Interpret a wire triple. The hour byte carries the sentinel.
    pub fn from_wire(hour: u8, minute: u8, offset: i8) -> Self {
        match hour {
            SUNRISE => SlotBoundary::Sunrise { offset },
            SUNSET => SlotBoundary::Sunset { offset },
            _ => SlotBoundary::Clock { hour, minute },
        }
    }
}

/// A dimming window within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSlot {
    /// Switch-on hour, or a sunrise/sunset sentinel.
    pub on_hour: u8,
    /// Switch-on minute.
    pub on_minute: u8,
    /// Minutes from the event when `on_hour` is a sentinel.
    pub on_offset: i8,
    /// Switch-off hour, or a sunrise/sunset sentinel.
    pub off_hour: u8,
    /// Switch-off minute.
    pub off_minute: u8,
    /// Minutes from the event when `off_hour` is a sentinel.
    pub off_offset: i8,
    /// Dim level, 0-100.
    pub value: u8,
}

impl TimeSlot {
    pub fn new(on: SlotBoundary, off: SlotBoundary, value: u8) -> Self {
        let (on_hour, on_minute, on_offset) = on.to_wire();
        let (off_hour, off_minute, off_offset) = off.to_wire();
        TimeSlot {
            on_hour,
            on_minute,
            on_offset,
            off_hour,
            off_minute,
            off_offset,
            value,
        }
    }

    pub fn on(&self) -> SlotBoundary {
        SlotBoundary::from_wire(self.on_hour, self.on_minute, self.on_offset)
    }

    pub fn off(&self) -> SlotBoundary {
        SlotBoundary::from_wire(self.off_hour, self.off_minute, self.off_offset)
    }

    /// All-zero filler slot.
    pub fn is_unused(&self) -> bool {
        *self == TimeSlot::default()
    }

    pub fn encode(&self) -> [u8; TIME_SLOT_SIZE] {
        [
            self.on_hour,
            self.on_minute,
            self.on_offset as u8,
            self.off_hour,
            self.off_minute,
            self.off_offset as u8,
            self.value,
        ]
    }

    /// Decode from exactly [`TIME_SLOT_SIZE`] bytes; callers bounds-check.
    fn from_bytes(b: &[u8]) -> Self {
        TimeSlot {
            on_hour: b[0],
            on_minute: b[1],
            on_offset: b[2] as i8,
            off_hour: b[3],
            off_minute: b[4],
            off_offset: b[5] as i8,
            value: b[6],
        }
    }
}

/// A complete schedule program as carried by Send Task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Deploy, update or delete.
    pub operation_type: OperationType,
    /// Slot key on the device.
    pub task_profile_id: u32,
    /// Offset from 2000.
    pub start_year: u8,
    /// Start month.
    pub start_month: u8,
    /// Start day of month.
    pub start_day: u8,
    /// Offset from 2000, or 99 for "Forever".
    pub end_year: u8,
    /// End month, or 99.
    pub end_month: u8,
    /// End day of month, or 99.
    pub end_day: u8,
    /// Opaque priority byte.
    pub priority: u8,
    /// Recurrence rule.
    pub cyclic_type: CyclicType,
    /// Interval in days for `CyclicType::Cyclic`.
    pub cyclic_time: u8,
    /// Bit 0 Sunday .. bit 6 Saturday; a set bit skips that day.
    pub off_days_mask: u8,
    /// Output channel the task drives.
    pub channel_number: u8,
    /// Always four; unused slots are zero.
    #[serde(deserialize_with = "deserialize_slots")]
    pub time_slots: [TimeSlot; TIME_SLOT_COUNT],
}

impl Default for TaskRecord {
    fn default() -> Self {
        TaskRecord {
            operation_type: OperationType::Deploy,
            task_profile_id: 1,
            start_year: 0,
            start_month: 1,
            start_day: 1,
            end_year: FOREVER,
            end_month: FOREVER,
            end_day: FOREVER,
            priority: 3,
            cyclic_type: CyclicType::Custom,
            cyclic_time: 0,
            off_days_mask: 0,
            channel_number: 1,
            time_slots: [TimeSlot::default(); TIME_SLOT_COUNT],
        }
    }
}

impl TaskRecord {
    /// Set the start date from a calendar date. The year is stored as an
    /// offset from 2000 and truncated to one byte.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_year = year_offset(date.year());
        self.start_month = date.month() as u8;
        self.start_day = date.day() as u8;
        self
    }

    /// Set a finite end date.
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_year = year_offset(date.year());
        self.end_month = date.month() as u8;
        self.end_day = date.day() as u8;
        self
    }

    /// Make the task run with no end date.
    pub fn forever(mut self) -> Self {
        self.end_year = FOREVER;
        self.end_month = FOREVER;
        self.end_day = FOREVER;
        self
    }

    /// Fill the slot array from up to four slots; the remainder is zeroed and
    /// anything past the fourth slot is ignored.
    pub fn with_slots(mut self, slots: &[TimeSlot]) -> Self {
        self.time_slots = [TimeSlot::default(); TIME_SLOT_COUNT];
        for (dst, src) in self.time_slots.iter_mut().zip(slots) {
            *dst = *src;
        }
        self
    }

    /// Exclude the given weekdays (custom recurrence only).
    pub fn with_off_days(mut self, days: &[Weekday]) -> Self {
        self.off_days_mask = Weekday::mask(days);
        self
    }

    pub fn ends_forever(&self) -> bool {
        self.end_year == FOREVER && self.end_month == FOREVER && self.end_day == FOREVER
    }

    /// Slots that carry a schedule.
    pub fn active_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.time_slots.iter().filter(|slot| !slot.is_unused())
    }

    /// Encode to the 44-byte wire layout.
    pub fn encode(&self) -> [u8; TASK_RECORD_SIZE] {
        let mut buf = [0u8; TASK_RECORD_SIZE];
        buf[0] = self.operation_type.into();
        buf[1..5].copy_from_slice(&self.task_profile_id.to_le_bytes());
        buf[5] = self.start_year;
        buf[6] = self.start_month;
        buf[7] = self.start_day;
        buf[8] = self.end_year;
        buf[9] = self.end_month;
        buf[10] = self.end_day;
        buf[11] = self.priority;
        buf[12] = self.cyclic_type.into();
        buf[13] = self.cyclic_time;
        buf[14] = self.off_days_mask;
        buf[15] = self.channel_number;

        for (i, slot) in self.time_slots.iter().enumerate() {
            let start = 16 + i * TIME_SLOT_SIZE;
            buf[start..start + TIME_SLOT_SIZE].copy_from_slice(&slot.encode());
        }
        buf
    }

    /// Decode the 44-byte wire layout from the start of `data`.
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        ProtocolError::check_len("task record", data, TASK_RECORD_SIZE)?;

        let mut time_slots = [TimeSlot::default(); TIME_SLOT_COUNT];
        for (i, slot) in time_slots.iter_mut().enumerate() {
            let start = 16 + i * TIME_SLOT_SIZE;
            *slot = TimeSlot::from_bytes(&data[start..start + TIME_SLOT_SIZE]);
        }

        Ok(TaskRecord {
            operation_type: OperationType::from(data[0]),
            task_profile_id: u32::from_le_bytes([data[1], data[2], data[3], data[4]]),
            start_year: data[5],
            start_month: data[6],
            start_day: data[7],
            end_year: data[8],
            end_month: data[9],
            end_day: data[10],
            priority: data[11],
            cyclic_type: CyclicType::from(data[12]),
            cyclic_time: data[13],
            off_days_mask: data[14],
            channel_number: data[15],
            time_slots,
        })
    }
}

fn year_offset(year: i32) -> u8 {
    ((year - YEAR_BASE as i32) & 0xFF) as u8
}

/// Accept zero to four slots and pad to the fixed array.
fn deserialize_slots<'de, D>(deserializer: D) -> Result<[TimeSlot; TIME_SLOT_COUNT], D::Error>
where
    D: Deserializer<'de>,
{
    let slots = Vec::<TimeSlot>::deserialize(deserializer)?;
    if slots.len() > TIME_SLOT_COUNT {
        return Err(serde::de::Error::invalid_length(
            slots.len(),
            &"at most 4 time slots",
        ));
    }
    let mut out = [TimeSlot::default(); TIME_SLOT_COUNT];
    out[..slots.len()].copy_from_slice(&slots);
    Ok(out)
}
