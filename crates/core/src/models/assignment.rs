use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RotaError, RotaResult};
use crate::models::time_slot::{hhmm, TimeRange};

pub const DISPENSARY: &str = "Dispensary";
pub const MANAGEMENT_TIME: &str = "Management Time";
pub const UNAVAILABLE_PHARMACISTS: &str = "Unavailable Pharmacists";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Ward,
    Dispensary,
    Clinic,
    Management,
    Unavailable,
}

/// Per-variant data carried by an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentKind {
    Ward,
    Dispensary { lunch_cover: bool },
    Clinic,
    Management,
    Unavailable,
}

impl AssignmentKind {
    pub fn assignment_type(&self) -> AssignmentType {
        match self {
            AssignmentKind::Ward => AssignmentType::Ward,
            AssignmentKind::Dispensary { .. } => AssignmentType::Dispensary,
            AssignmentKind::Clinic => AssignmentType::Clinic,
            AssignmentKind::Management => AssignmentType::Management,
            AssignmentKind::Unavailable => AssignmentType::Unavailable,
        }
    }

    /// Location name every assignment of this kind must use, if fixed.
    pub fn fixed_location(&self) -> Option<&'static str> {
        match self {
            AssignmentKind::Dispensary { .. } => Some(DISPENSARY),
            AssignmentKind::Management => Some(MANAGEMENT_TIME),
            AssignmentKind::Unavailable => Some(UNAVAILABLE_PHARMACISTS),
            AssignmentKind::Ward | AssignmentKind::Clinic => None,
        }
    }
}

/// One pharmacist covering one location for one time range on one date.
///
/// Instances are only created through [`Assignment::new`] (or by
/// deserialising, which runs the same checks) and are never mutated in
/// place; [`Assignment::reassigned`] produces a copy for a new holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord", into = "AssignmentRecord")]
pub struct Assignment {
    location: String,
    kind: AssignmentKind,
    pharmacist_id: Uuid,
    date: NaiveDate,
    range: TimeRange,
}

impl Assignment {
    pub fn new(
        kind: AssignmentKind,
        location: impl Into<String>,
        pharmacist_id: Uuid,
        date: NaiveDate,
        range: TimeRange,
    ) -> RotaResult<Self> {
        let location = location.into();
        let location = location.trim();
        if location.is_empty() {
            return Err(RotaError::Validation(
                "Assignment location must not be empty".to_string(),
            ));
        }
        if range.start >= range.end {
            return Err(RotaError::Validation(format!(
                "Assignment at {} has an empty time range {}",
                location, range
            )));
        }
        if let Some(expected) = kind.fixed_location() {
            if location != expected {
                return Err(RotaError::Validation(format!(
                    "{:?} assignments must use location '{}', got '{}'",
                    kind.assignment_type(),
                    expected,
                    location
                )));
            }
        }

        Ok(Self {
            location: location.to_string(),
            kind,
            pharmacist_id,
            date,
            range,
        })
    }

    pub fn ward(
        location: impl Into<String>,
        pharmacist_id: Uuid,
        date: NaiveDate,
        range: TimeRange,
    ) -> RotaResult<Self> {
        Self::new(AssignmentKind::Ward, location, pharmacist_id, date, range)
    }

    pub fn dispensary(
        pharmacist_id: Uuid,
        date: NaiveDate,
        range: TimeRange,
        lunch_cover: bool,
    ) -> RotaResult<Self> {
        Self::new(
            AssignmentKind::Dispensary { lunch_cover },
            DISPENSARY,
            pharmacist_id,
            date,
            range,
        )
    }

    pub fn clinic(
        name: impl Into<String>,
        pharmacist_id: Uuid,
        date: NaiveDate,
        range: TimeRange,
    ) -> RotaResult<Self> {
        Self::new(AssignmentKind::Clinic, name, pharmacist_id, date, range)
    }

    pub fn management(pharmacist_id: Uuid, date: NaiveDate, range: TimeRange) -> RotaResult<Self> {
        Self::new(
            AssignmentKind::Management,
            MANAGEMENT_TIME,
            pharmacist_id,
            date,
            range,
        )
    }

    pub fn unavailable(pharmacist_id: Uuid, date: NaiveDate, range: TimeRange) -> RotaResult<Self> {
        Self::new(
            AssignmentKind::Unavailable,
            UNAVAILABLE_PHARMACISTS,
            pharmacist_id,
            date,
            range,
        )
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> AssignmentKind {
        self.kind
    }

    pub fn assignment_type(&self) -> AssignmentType {
        self.kind.assignment_type()
    }

    pub fn pharmacist_id(&self) -> Uuid {
        self.pharmacist_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn is_lunch_cover(&self) -> bool {
        matches!(self.kind, AssignmentKind::Dispensary { lunch_cover: true })
    }

    pub fn is_full_day(&self) -> bool {
        self.range.is_full_day()
    }

    /// Copy of this assignment held by another pharmacist.
    pub fn reassigned(&self, pharmacist_id: Uuid) -> Self {
        Self {
            pharmacist_id,
            ..self.clone()
        }
    }

    /// Two assignments with the same identity may not coexist in one rota.
    pub fn same_identity(&self, other: &Assignment) -> bool {
        self.pharmacist_id == other.pharmacist_id
            && self.location == other.location
            && self.range == other.range
    }
}

/// Wire shape of an assignment, as stored and exchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub location: String,
    #[serde(rename = "type")]
    pub assignment_type: AssignmentType,
    pub pharmacist_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: chrono::NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: chrono::NaiveTime,
    #[serde(default)]
    pub is_lunch_cover: bool,
}

impl TryFrom<AssignmentRecord> for Assignment {
    type Error = RotaError;

    fn try_from(record: AssignmentRecord) -> RotaResult<Self> {
        let kind = match record.assignment_type {
            AssignmentType::Dispensary => AssignmentKind::Dispensary {
                lunch_cover: record.is_lunch_cover,
            },
            _ if record.is_lunch_cover => {
                return Err(RotaError::Validation(format!(
                    "Only dispensary assignments can be lunch cover, got {:?}",
                    record.assignment_type
                )));
            }
            AssignmentType::Ward => AssignmentKind::Ward,
            AssignmentType::Clinic => AssignmentKind::Clinic,
            AssignmentType::Management => AssignmentKind::Management,
            AssignmentType::Unavailable => AssignmentKind::Unavailable,
        };

        Assignment::new(
            kind,
            record.location,
            record.pharmacist_id,
            record.date,
            TimeRange {
                start: record.start_time,
                end: record.end_time,
            },
        )
    }
}

impl From<Assignment> for AssignmentRecord {
    fn from(assignment: Assignment) -> Self {
        let is_lunch_cover = assignment.is_lunch_cover();
        Self {
            assignment_type: assignment.assignment_type(),
            location: assignment.location,
            pharmacist_id: assignment.pharmacist_id,
            date: assignment.date,
            start_time: assignment.range.start,
            end_time: assignment.range.end,
            is_lunch_cover,
        }
    }
}
