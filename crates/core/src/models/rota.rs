use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RotaError, RotaResult};
use crate::models::assignment::Assignment;
use crate::models::time_slot::Week;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotaStatus {
    Draft,
    Published,
}

impl RotaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotaStatus::Draft => "draft",
            RotaStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for RotaStatus {
    type Err = RotaError;

    fn from_str(value: &str) -> RotaResult<Self> {
        match value {
            "draft" => Ok(RotaStatus::Draft),
            "published" => Ok(RotaStatus::Published),
            other => Err(RotaError::Validation(format!("Unknown rota status '{}'", other))),
        }
    }
}

/// Position addressed by an assignment write.
///
/// On the wire this is an integer index, with `-1` meaning "append".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AssignmentSlot {
    Append,
    At(usize),
}

impl TryFrom<i64> for AssignmentSlot {
    type Error = RotaError;

    fn try_from(value: i64) -> RotaResult<Self> {
        match value {
            -1 => Ok(AssignmentSlot::Append),
            index if index >= 0 => Ok(AssignmentSlot::At(index as usize)),
            other => Err(RotaError::Validation(format!(
                "Invalid assignment index {}",
                other
            ))),
        }
    }
}

impl From<AssignmentSlot> for i64 {
    fn from(slot: AssignmentSlot) -> Self {
        match slot {
            AssignmentSlot::Append => -1,
            AssignmentSlot::At(index) => index as i64,
        }
    }
}

/// All assignments for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rota {
    pub id: Uuid,
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub status: RotaStatus,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub included_weekdays: Option<Vec<Weekday>>,
    #[serde(default)]
    pub free_cell_text: BTreeMap<String, String>,
    #[serde(default)]
    pub original_rota_id: Option<Uuid>,
    #[serde(default)]
    pub published_by: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Rota {
    pub fn draft(date: NaiveDate, included_weekdays: Option<Vec<Weekday>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            week_start: Week::containing(date).start,
            status: RotaStatus::Draft,
            assignments: Vec::new(),
            included_weekdays,
            free_cell_text: BTreeMap::new(),
            original_rota_id: None,
            published_by: None,
            published_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Checks that no two assignments share pharmacist, location and range.
    pub fn validate(&self) -> RotaResult<()> {
        for (i, assignment) in self.assignments.iter().enumerate() {
            if assignment.date() != self.date {
                return Err(RotaError::Validation(format!(
                    "Assignment dated {} stored in rota for {}",
                    assignment.date(),
                    self.date
                )));
            }
            if self.assignments[..i]
                .iter()
                .any(|earlier| earlier.same_identity(assignment))
            {
                return Err(duplicate_error(assignment));
            }
        }
        Ok(())
    }

    pub fn push_assignment(&mut self, assignment: Assignment) -> RotaResult<()> {
        self.check_insertable(&assignment, None)?;
        self.assignments.push(assignment);
        Ok(())
    }

    /// Applies one positional write.
    ///
    /// `Append` requires `new_assignment`. `At(i)` with a pharmacist replaces
    /// the entry (using `new_assignment` as the template when given) and
    /// with no pharmacist removes it.
    pub fn apply_update(
        &mut self,
        slot: AssignmentSlot,
        pharmacist_id: Option<Uuid>,
        new_assignment: Option<Assignment>,
    ) -> RotaResult<()> {
        match slot {
            AssignmentSlot::Append => {
                let template = new_assignment.ok_or_else(|| {
                    RotaError::Validation("Appending requires an assignment".to_string())
                })?;
                let assignment = match pharmacist_id {
                    Some(id) => template.reassigned(id),
                    None => template,
                };
                self.push_assignment(assignment)
            }
            AssignmentSlot::At(index) => {
                let existing = self.assignments.get(index).ok_or_else(|| {
                    RotaError::NotFound(format!(
                        "Assignment index {} out of range for rota {}",
                        index, self.id
                    ))
                })?;

                match pharmacist_id {
                    None => {
                        self.assignments.remove(index);
                        Ok(())
                    }
                    Some(id) => {
                        let replacement = new_assignment
                            .unwrap_or_else(|| existing.clone())
                            .reassigned(id);
                        self.check_insertable(&replacement, Some(index))?;
                        self.assignments[index] = replacement;
                        Ok(())
                    }
                }
            }
        }
    }

    /// Published snapshot of this rota, linked back to it.
    pub fn carbon_copy(&self, published_by: &str, published_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RotaStatus::Published,
            original_rota_id: Some(self.id),
            published_by: Some(published_by.to_string()),
            published_at: Some(published_at),
            created_at: published_at,
            ..self.clone()
        }
    }

    fn check_insertable(&self, candidate: &Assignment, skip: Option<usize>) -> RotaResult<()> {
        if candidate.date() != self.date {
            return Err(RotaError::Validation(format!(
                "Assignment dated {} cannot be stored in rota for {}",
                candidate.date(),
                self.date
            )));
        }
        let clash = self
            .assignments
            .iter()
            .enumerate()
            .any(|(i, existing)| Some(i) != skip && existing.same_identity(candidate));
        if clash {
            return Err(duplicate_error(candidate));
        }
        Ok(())
    }
}

fn duplicate_error(assignment: &Assignment) -> RotaError {
    RotaError::Conflict(format!(
        "Pharmacist {} already holds {} {} on {}",
        assignment.pharmacist_id(),
        assignment.location(),
        assignment.range(),
        assignment.date()
    ))
}
