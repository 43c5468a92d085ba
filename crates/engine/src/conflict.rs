use std::collections::BTreeSet;

use chrono::NaiveDate;
use rota_core::models::{
    assignment::AssignmentType,
    time_slot::{standard_slots, TimeRange},
};
use serde::Serialize;
use uuid::Uuid;

use crate::index::AssignmentIndex;

/// A pharmacist double-booked on a ward and a clinic or the dispensary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub pharmacist_id: Uuid,
    pub date: NaiveDate,
    pub slot: TimeRange,
}

/// Advisory only; conflicts change how a cell is drawn, never whether a
/// write is allowed.
pub struct ConflictDetector<'a> {
    index: &'a AssignmentIndex,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(index: &'a AssignmentIndex) -> Self {
        Self { index }
    }

    pub fn has_conflict(&self, pharmacist_id: Uuid, date: NaiveDate, slot: &TimeRange) -> bool {
        let Some(rota) = self.index.rota_for(date) else {
            return false;
        };
        let held = || rota.assignments.iter().filter(|a| a.pharmacist_id() == pharmacist_id);

        let on_ward = held()
            .any(|a| a.assignment_type() == AssignmentType::Ward && a.range().covers(slot));
        on_ward
            && held().any(|a| {
                matches!(
                    a.assignment_type(),
                    AssignmentType::Clinic | AssignmentType::Dispensary
                ) && a.range().intersects(slot)
            })
    }

    /// Every conflicting (pharmacist, date, slot) in the week.
    pub fn week_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for rota in self.index.rotas() {
            let ward_holders: BTreeSet<Uuid> = rota
                .assignments
                .iter()
                .filter(|a| a.assignment_type() == AssignmentType::Ward)
                .map(|a| a.pharmacist_id())
                .collect();

            for pharmacist_id in ward_holders {
                for slot in standard_slots() {
                    if self.has_conflict(pharmacist_id, rota.date, &slot) {
                        conflicts.push(Conflict {
                            pharmacist_id,
                            date: rota.date,
                            slot,
                        });
                    }
                }
            }
        }
        conflicts
    }
}
