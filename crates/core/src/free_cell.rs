//! Structured keys for free-text cell overrides.
//!
//! Two key shapes are in use:
//!
//! - slot-keyed cells (dispensary, clinic and ward slots):
//!   `<location>-<YYYY-MM-DD>-<HH:MM>-<HH:MM>`
//! - day-keyed plain cells (unavailable and management rows):
//!   `<location>-<YYYY-MM-DD>`
//!
//! Locations may themselves contain hyphens, so keys are parsed from the
//! right.

use std::fmt;

use chrono::NaiveDate;

use crate::errors::{RotaError, RotaResult};
use crate::models::time_slot::{parse_time, TimeRange};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FreeCellKey {
    Slot {
        location: String,
        date: NaiveDate,
        range: TimeRange,
    },
    Day {
        location: String,
        date: NaiveDate,
    },
}

impl FreeCellKey {
    pub fn parse(key: &str) -> RotaResult<Self> {
        let parts: Vec<&str> = key.split('-').collect();
        let n = parts.len();
        let invalid = || RotaError::Validation(format!("Unrecognised free cell key '{}'", key));

        let slot_shaped = n >= 6
            && parse_time(parts[n - 1]).is_ok()
            && parse_time(parts[n - 2]).is_ok();

        if slot_shaped {
            let range = TimeRange::parse(parts[n - 2], parts[n - 1])?;
            let date = parse_date(&parts[n - 5..n - 2]).ok_or_else(invalid)?;
            let location = parts[..n - 5].join("-");
            if location.is_empty() {
                return Err(invalid());
            }
            return Ok(FreeCellKey::Slot { location, date, range });
        }

        if n >= 4 {
            let date = parse_date(&parts[n - 3..]).ok_or_else(invalid)?;
            let location = parts[..n - 3].join("-");
            if location.is_empty() {
                return Err(invalid());
            }
            return Ok(FreeCellKey::Day { location, date });
        }

        Err(invalid())
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            FreeCellKey::Slot { date, .. } | FreeCellKey::Day { date, .. } => *date,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            FreeCellKey::Slot { location, .. } | FreeCellKey::Day { location, .. } => location,
        }
    }
}

impl fmt::Display for FreeCellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeCellKey::Slot { location, date, range } => {
                write!(f, "{}-{}-{}", location, date.format("%Y-%m-%d"), range)
            }
            FreeCellKey::Day { location, date } => {
                write!(f, "{}-{}", location, date.format("%Y-%m-%d"))
            }
        }
    }
}

fn parse_date(parts: &[&str]) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&parts.join("-"), "%Y-%m-%d").ok()
}
