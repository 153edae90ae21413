//! Common types shared by commands and uplink reports.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Day of the week as numbered by the controller (0 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Sunday first, matching the bit order of the off-days mask.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Weekday::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    pub fn turkish_name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Pazar",
            Weekday::Monday => "Pazartesi",
            Weekday::Tuesday => "Salı",
            Weekday::Wednesday => "Çarşamba",
            Weekday::Thursday => "Perşembe",
            Weekday::Friday => "Cuma",
            Weekday::Saturday => "Cumartesi",
        }
    }

    /// Days whose bit is set in `mask` (bit 0 = Sunday). Bit 7 is ignored.
    pub fn from_mask(mask: u8) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| mask & (1 << day.index()) != 0)
            .collect()
    }

    /// Inverse of [`Weekday::from_mask`].
    pub fn mask(days: &[Weekday]) -> u8 {
        days.iter().fold(0, |mask, day| mask | (1 << day.index()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_sunday() as usize]
    }
}

/// Language used for weekday names in date/time reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayNameLocale {
    #[default]
    Turkish,
    English,
}

impl DayNameLocale {
    /// Name of the given day index, or `"Unknown"` outside 0..=6.
    pub fn day_name(self, day_of_week: u8) -> &'static str {
        match (Weekday::from_index(day_of_week), self) {
            (Some(day), DayNameLocale::Turkish) => day.turkish_name(),
            (Some(day), DayNameLocale::English) => day.english_name(),
            (None, _) => "Unknown",
        }
    }
}

/// Options controlling how uplinks are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Locale of `day_name` in date/time settings reports.
    pub day_names: DayNameLocale,
}

/// Settings group 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UplinkSettings {
    /// Reporting interval as configured on the device.
    pub uplink_time: u8,
    /// Send uplinks as confirmed messages.
    pub is_confirmed: bool,
    /// Rejoin the network after a restart.
    pub force_rejoin_restart: bool,
}

impl UplinkSettings {
    pub(crate) fn encode(&self) -> [u8; 3] {
        [
            self.uplink_time,
            u8::from(self.is_confirmed),
            u8::from(self.force_rejoin_restart),
        ]
    }

    /// Flags read as true only when the byte is exactly 1.
    pub(crate) fn from_bytes(b: &[u8]) -> Self {
        UplinkSettings {
            uplink_time: b[0],
            is_confirmed: b[1] == 1,
            force_rejoin_restart: b[2] == 1,
        }
    }
}

/// Settings group 5: the device real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSettings {
    /// Offset from 2000.
    pub year: u8,
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
}

impl Default for DateTimeSettings {
    fn default() -> Self {
        DateTimeSettings {
            year: 0,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            day_of_week: 0,
        }
    }
}

impl DateTimeSettings {
    /// Take the clock value from any chrono date-time. The weekday is derived
    /// from the date; the year is truncated to one byte after removing 2000.
    pub fn from_datetime<T: Datelike + Timelike>(dt: &T) -> Self {
        DateTimeSettings {
            year: ((dt.year() - YEAR_BASE as i32) & 0xFF) as u8,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            day_of_week: dt.weekday().num_days_from_sunday() as u8,
        }
    }

    pub(crate) fn encode(&self) -> [u8; 7] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.day_of_week,
        ]
    }

    pub(crate) fn from_bytes(b: &[u8]) -> Self {
        DateTimeSettings {
            year: b[0],
            month: b[1],
            day: b[2],
            hour: b[3],
            minute: b[4],
            second: b[5],
            day_of_week: b[6],
        }
    }
}

/// A settings group write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsGroup {
    Uplink(UplinkSettings),
    DateTime(DateTimeSettings),
    /// Any other group; only the id is sent.
    Other(u8),
}

impl SettingsGroup {
    /// Group for a bare id. Groups 4 and 5 get their default payloads so the
    /// encoded length always matches the group.
    pub fn from_group_id(group_id: u8) -> Self {
        match group_id {
            SETTINGS_GROUP_UPLINK => SettingsGroup::Uplink(UplinkSettings::default()),
            SETTINGS_GROUP_DATE_TIME => SettingsGroup::DateTime(DateTimeSettings::default()),
            other => SettingsGroup::Other(other),
        }
    }

    pub fn group_id(&self) -> u8 {
        match self {
            SettingsGroup::Uplink(_) => SETTINGS_GROUP_UPLINK,
            SettingsGroup::DateTime(_) => SETTINGS_GROUP_DATE_TIME,
            SettingsGroup::Other(id) => *id,
        }
    }

    /// Body bytes, group id first. A bare id of 4 or 5 is written with that
    /// group's default payload.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let group = match *self {
            SettingsGroup::Other(id) => SettingsGroup::from_group_id(id),
            group => group,
        };
        let mut buf = Vec::with_capacity(DATE_TIME_SETTINGS_SIZE);
        buf.push(group.group_id());
        match &group {
            SettingsGroup::Uplink(settings) => buf.extend_from_slice(&settings.encode()),
            SettingsGroup::DateTime(settings) => buf.extend_from_slice(&settings.encode()),
            SettingsGroup::Other(_) => {}
        }
        buf
    }
}

/// Installation position used for astronomical (sunrise/sunset) slots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Degrees north.
    pub latitude: f32,
    /// Degrees east.
    pub longitude: f32,
    /// UTC offset in hours; fractional zones are allowed.
    pub timezone: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_weekday_mask() {
        let days = Weekday::from_mask(0b100_0001);
        assert_eq!(days, vec![Weekday::Sunday, Weekday::Saturday]);
        assert_eq!(Weekday::mask(&days), 0b100_0001);
        assert!(Weekday::from_mask(0).is_empty());
        assert_eq!(Weekday::from_mask(0xFF).len(), 7);
    }

    #[test]
    fn test_day_names() {
        assert_eq!(DayNameLocale::Turkish.day_name(3), "Çarşamba");
        assert_eq!(DayNameLocale::English.day_name(3), "Wednesday");
        assert_eq!(DayNameLocale::default().day_name(0), "Pazar");
        assert_eq!(DayNameLocale::Turkish.day_name(7), "Unknown");
    }

    #[test]
    fn test_date_time_from_chrono() {
        let dt = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap();
        let settings = DateTimeSettings::from_datetime(&dt);
        assert_eq!(
            settings,
            DateTimeSettings {
                year: 25,
                month: 6,
                day: 15,
                hour: 12,
                minute: 30,
                second: 5,
                day_of_week: 0,
            }
        );
        assert_eq!(Weekday::from(dt.weekday()), Weekday::Sunday);
    }

    #[test]
    fn test_settings_group_from_id() {
        assert_eq!(SettingsGroup::from_group_id(4).encode(), vec![4, 0, 0, 0]);
        assert_eq!(SettingsGroup::from_group_id(5).encode(), vec![5, 0, 1, 1, 0, 0, 0, 0]);
        assert_eq!(SettingsGroup::from_group_id(9).encode(), vec![9]);
    }

    #[test]
    fn test_bare_known_group_keeps_layout() {
        assert_eq!(SettingsGroup::Other(4).encode(), vec![4, 0, 0, 0]);
        assert_eq!(SettingsGroup::Other(5).encode().len(), DATE_TIME_SETTINGS_SIZE);

        let group: SettingsGroup = serde_json::from_str(r#"{"other": 5}"#).unwrap();
        assert_eq!(group.encode(), vec![5, 0, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_options_config() {
        let opts: DecodeOptions = serde_json::from_str(r#"{"day_names": "english"}"#).unwrap();
        assert_eq!(opts.day_names, DayNameLocale::English);
        let opts: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.day_names, DayNameLocale::Turkish);
        assert!(serde_json::from_str::<DecodeOptions>(r#"{"locale": "x"}"#).is_err());
    }
}
