use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{RotaError, RotaResult};

const TIME_FORMAT: &str = "%H:%M";

/// Parses an `HH:MM` local time-of-day string.
pub fn parse_time(value: &str) -> RotaResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| RotaError::Validation(format!("Invalid time '{}': {}", value, e)))
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Serde adapter storing a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// A half-open local time range on a single day.
///
/// `00:00`–`23:59` is the full-day sentinel used by ward assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeRecord")]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Deserialize)]
struct TimeRangeRecord {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<TimeRangeRecord> for TimeRange {
    type Error = RotaError;

    fn try_from(record: TimeRangeRecord) -> RotaResult<Self> {
        TimeRange::new(record.start, record.end)
    }
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> RotaResult<Self> {
        if start >= end {
            return Err(RotaError::Validation(format!(
                "Time range must start before it ends: {}-{}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> RotaResult<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn full_day() -> Self {
        Self {
            start: hm(0, 0),
            end: hm(23, 59),
        }
    }

    pub fn is_full_day(&self) -> bool {
        *self == Self::full_day()
    }

    /// True when this range spans all of `other`.
    pub fn covers(&self, other: &TimeRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Open intersection: touching ranges do not intersect.
    pub fn intersects(&self, other: &TimeRange) -> bool {
        !(other.end <= self.start || other.start >= self.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// The four half-day slots making up the grid's time axis.
pub fn standard_slots() -> [TimeRange; 4] {
    [
        TimeRange { start: hm(9, 0), end: hm(11, 0) },
        TimeRange { start: hm(11, 0), end: hm(13, 0) },
        TimeRange { start: hm(13, 0), end: hm(15, 0) },
        TimeRange { start: hm(15, 0), end: hm(17, 0) },
    ]
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Monday to Friday, the default weekday selection for a new week.
pub fn default_weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

/// A rota week anchored on its Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    pub start: NaiveDate,
}

impl Week {
    /// Returns the week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            start: date - Duration::days(offset),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..7).map(|offset| self.start + Duration::days(offset)).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.start + Duration::days(7)
    }

    pub fn date_of(&self, day: Weekday) -> NaiveDate {
        self.start + Duration::days(day.num_days_from_monday() as i64)
    }
}
