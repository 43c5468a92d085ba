//! Planning a cell edit into an ordered batch of writes.
//!
//! Within a batch, reassignments and appends come first and removals last,
//! highest position first per rota, so that every positional index stays
//! valid while the batch runs.

use chrono::{Datelike, NaiveDate};
use rota_core::{
    errors::RotaResult,
    models::{
        assignment::{Assignment, AssignmentKind, AssignmentType},
        pharmacist::Pharmacist,
        rota::Rota,
        time_slot::{standard_slots, TimeRange},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    availability::AvailabilityResolver,
    deselection::DeselectionResolver,
    index::AssignmentIndex,
    scope::{Scope, ScopeResolver, ScopeTarget},
    sequencer::{WriteBatch, WriteIntent},
    session::EditSession,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EditAction {
    /// Put `pharmacist_id` in the cell, replacing `replacing` when given
    /// and the primary occupant otherwise.
    #[serde(rename_all = "camelCase")]
    Assign {
        #[serde(default)]
        replacing: Option<Uuid>,
        pharmacist_id: Uuid,
    },
    /// Add another occupant alongside the existing ones.
    #[serde(rename_all = "camelCase")]
    Add { pharmacist_id: Uuid },
    /// Remove one occupant, or everyone when no pharmacist is given.
    #[serde(rename_all = "camelCase")]
    Clear {
        #[serde(default)]
        pharmacist_id: Option<Uuid>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub assignment_type: AssignmentType,
    pub location: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub slot: Option<TimeRange>,
    pub scope: Scope,
    #[serde(default)]
    pub lunch_cover: bool,
    pub action: EditAction,
}

impl CellEdit {
    pub fn kind(&self) -> AssignmentKind {
        match self.assignment_type {
            AssignmentType::Ward => AssignmentKind::Ward,
            AssignmentType::Dispensary => AssignmentKind::Dispensary {
                lunch_cover: self.lunch_cover,
            },
            AssignmentType::Clinic => AssignmentKind::Clinic,
            AssignmentType::Management => AssignmentKind::Management,
            AssignmentType::Unavailable => AssignmentKind::Unavailable,
        }
    }

    /// Ranges a new assignment is created with when the cell is empty.
    fn creation_ranges(&self) -> Vec<TimeRange> {
        match (self.scope, self.assignment_type, self.slot) {
            (Scope::Slot, _, Some(slot)) => vec![slot],
            (_, AssignmentType::Ward, _) => vec![TimeRange::full_day()],
            (_, AssignmentType::Clinic, Some(slot)) => vec![slot],
            _ => standard_slots().to_vec(),
        }
    }

    fn holder_filter(&self) -> Option<Uuid> {
        match self.action {
            EditAction::Assign { replacing, .. } => replacing,
            EditAction::Add { .. } => None,
            EditAction::Clear { pharmacist_id } => pharmacist_id,
        }
    }
}

/// Advisory findings; none of them stop a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanWarning {
    #[serde(rename_all = "camelCase")]
    Unavailable {
        pharmacist_id: Uuid,
        date: NaiveDate,
        slot: TimeRange,
    },
    #[serde(rename_all = "camelCase")]
    AlreadyAssigned {
        pharmacist_id: Uuid,
        date: NaiveDate,
        slot: TimeRange,
    },
    #[serde(rename_all = "camelCase")]
    NoRota { date: NaiveDate },
    #[serde(rename_all = "camelCase")]
    NothingToUpdate { date: NaiveDate },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    pub batch: WriteBatch,
    pub warnings: Vec<PlanWarning>,
}

pub struct EditPlanner<'a> {
    session: &'a EditSession,
    index: &'a AssignmentIndex,
    pharmacists: &'a [Pharmacist],
}

impl<'a> EditPlanner<'a> {
    pub fn new(
        session: &'a EditSession,
        index: &'a AssignmentIndex,
        pharmacists: &'a [Pharmacist],
    ) -> Self {
        Self {
            session,
            index,
            pharmacists,
        }
    }

    pub fn plan(&self, edit: &CellEdit) -> RotaResult<EditPlan> {
        let targets = ScopeResolver::new(self.index).resolve(
            &edit.location,
            edit.date,
            edit.scope,
            edit.slot.as_ref(),
            edit.holder_filter(),
        )?;

        let dates = match edit.scope {
            Scope::Slot | Scope::Day => vec![edit.date],
            Scope::Week => DeselectionResolver::new(self.session, self.index).active_dates(),
        };

        let mut builder = PlanBuilder::default();
        for date in dates {
            let Some(rota) = self.index.rota_for(date) else {
                if edit.scope != Scope::Week {
                    warn!("No rota for {}; nothing to update", date);
                    builder.warnings.push(PlanWarning::NoRota { date });
                }
                continue;
            };
            let target = targets.iter().find(|t| t.date == date);
            self.plan_date(edit, rota, target, &mut builder)?;
        }

        let plan = builder.finish(self);
        debug!(
            "Planned {} writes for {:?} edit of {} on {}",
            plan.batch.len(),
            edit.scope,
            edit.location,
            edit.date
        );
        Ok(plan)
    }

    fn plan_date(
        &self,
        edit: &CellEdit,
        rota: &Rota,
        target: Option<&ScopeTarget>,
        builder: &mut PlanBuilder,
    ) -> RotaResult<()> {
        match (&edit.action, target) {
            (EditAction::Assign { replacing, pharmacist_id }, Some(target)) => {
                builder.reassign(rota, &target.indices, replacing.is_none(), *pharmacist_id);
            }
            (EditAction::Assign { replacing: None, pharmacist_id }, None) => {
                for range in edit.creation_ranges() {
                    builder.append(rota, edit, range, *pharmacist_id)?;
                }
            }
            (EditAction::Assign { replacing: Some(holder), .. }, None) => {
                debug!(
                    "{} holds nothing at {} on {}; nothing to update",
                    holder, edit.location, rota.date
                );
                builder
                    .warnings
                    .push(PlanWarning::NothingToUpdate { date: rota.date });
            }
            (EditAction::Add { pharmacist_id }, target) => {
                let ranges = match (edit.scope, target) {
                    (Scope::Slot, _) | (_, None) => edit.creation_ranges(),
                    (_, Some(target)) => distinct_ranges(rota, &target.indices),
                };
                for range in ranges {
                    builder.append(rota, edit, range, *pharmacist_id)?;
                }
            }
            (EditAction::Clear { .. }, Some(target)) => {
                for &index in &target.indices {
                    builder.remove(rota, index);
                }
            }
            (EditAction::Clear { .. }, None) => {
                builder
                    .warnings
                    .push(PlanWarning::NothingToUpdate { date: rota.date });
            }
        }
        Ok(())
    }

    fn pharmacist(&self, id: Uuid) -> Option<&Pharmacist> {
        self.pharmacists.iter().find(|p| p.id == id)
    }
}

fn distinct_ranges(rota: &Rota, indices: &[usize]) -> Vec<TimeRange> {
    let mut ranges: Vec<TimeRange> = Vec::new();
    for range in indices
        .iter()
        .filter_map(|&i| rota.assignments.get(i))
        .map(|a| a.range())
    {
        if !ranges.contains(&range) {
            ranges.push(range);
        }
    }
    ranges
}

#[derive(Default)]
struct PlanBuilder {
    writes: Vec<WriteIntent>,
    removals: Vec<(NaiveDate, Uuid, usize)>,
    placed: Vec<(Uuid, NaiveDate, TimeRange)>,
    warnings: Vec<PlanWarning>,
}

impl PlanBuilder {
    fn reassign(&mut self, rota: &Rota, indices: &[usize], primary_only: bool, pharmacist_id: Uuid) {
        let mut seen: Vec<TimeRange> = Vec::new();
        for &index in indices {
            let Some(current) = rota.assignments.get(index) else {
                continue;
            };
            if primary_only {
                if seen.contains(&current.range()) {
                    continue;
                }
                seen.push(current.range());
            }
            if current.pharmacist_id() == pharmacist_id {
                continue;
            }

            let candidate = current.reassigned(pharmacist_id);
            if rota.assignments.iter().any(|other| other.same_identity(&candidate)) {
                // Already in the cell; drop the replaced occupant instead.
                self.remove(rota, index);
            } else {
                self.writes.push(WriteIntent::Reassign {
                    rota_id: rota.id,
                    index,
                    pharmacist_id,
                });
            }
            self.placed.push((pharmacist_id, rota.date, current.range()));
        }
    }

    fn append(
        &mut self,
        rota: &Rota,
        edit: &CellEdit,
        range: TimeRange,
        pharmacist_id: Uuid,
    ) -> RotaResult<()> {
        let assignment = Assignment::new(edit.kind(), edit.location.clone(), pharmacist_id, rota.date, range)?;
        let duplicate = rota
            .assignments
            .iter()
            .any(|existing| existing.same_identity(&assignment));
        if duplicate {
            self.warnings.push(PlanWarning::AlreadyAssigned {
                pharmacist_id,
                date: rota.date,
                slot: range,
            });
            return Ok(());
        }

        self.placed.push((pharmacist_id, rota.date, range));
        self.writes.push(WriteIntent::Append {
            rota_id: rota.id,
            assignment,
        });
        Ok(())
    }

    fn remove(&mut self, rota: &Rota, index: usize) {
        let entry = (rota.date, rota.id, index);
        if !self.removals.contains(&entry) {
            self.removals.push(entry);
        }
    }

    fn finish(mut self, planner: &EditPlanner<'_>) -> EditPlan {
        let availability = AvailabilityResolver::new(planner.session);
        for (pharmacist_id, date, range) in &self.placed {
            let Some(pharmacist) = planner.pharmacist(*pharmacist_id) else {
                continue;
            };
            if availability.is_unavailable(pharmacist, date.weekday(), range) {
                self.warnings.push(PlanWarning::Unavailable {
                    pharmacist_id: *pharmacist_id,
                    date: *date,
                    slot: *range,
                });
            }
        }

        self.removals
            .sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(b.2.cmp(&a.2)));
        let mut intents = self.writes;
        intents.extend(
            self.removals
                .into_iter()
                .map(|(_, rota_id, index)| WriteIntent::Remove { rota_id, index }),
        );

        EditPlan {
            batch: WriteBatch::from(intents),
            warnings: self.warnings,
        }
    }
}
