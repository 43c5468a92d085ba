//! In-memory view of the assignments for the visible week.
//!
//! The index is rebuilt wholesale from remote rotas after every write; it is
//! never patched incrementally except for the optimistic swap, which is
//! either confirmed by the next rebuild or reverted.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use rota_core::models::{
    assignment::{Assignment, AssignmentType, DISPENSARY},
    rota::{Rota, RotaStatus},
    time_slot::{TimeRange, Week},
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AssignmentIndex {
    week: Week,
    view: RotaStatus,
    containers: BTreeMap<NaiveDate, Rota>,
    lineage: HashMap<Uuid, Option<Vec<Weekday>>>,
    from_snapshot: bool,
}

impl AssignmentIndex {
    /// Builds the index for `week`.
    ///
    /// `remote` may hold rotas of any status and week; the shown rota per
    /// date is the newest one with status `view`. A `snapshot` replaces the
    /// remote rotas entirely while present.
    pub fn build(week: Week, view: RotaStatus, remote: &[Rota], snapshot: Option<&[Rota]>) -> Self {
        let mut lineage = HashMap::new();
        for rota in remote.iter().chain(snapshot.unwrap_or_default()) {
            lineage.insert(rota.id, rota.included_weekdays.clone());
        }

        let (source, from_snapshot) = match snapshot {
            Some(rotas) => (rotas, true),
            None => (remote, false),
        };

        let mut containers: BTreeMap<NaiveDate, Rota> = BTreeMap::new();
        for rota in source
            .iter()
            .filter(|rota| week.contains(rota.date))
            .filter(|rota| from_snapshot || rota.status == view)
        {
            let newer = containers
                .get(&rota.date)
                .is_none_or(|current| rota.created_at > current.created_at);
            if newer {
                containers.insert(rota.date, rota.clone());
            }
        }

        debug!(
            "Built assignment index for week of {}: {} rotas (snapshot: {})",
            week.start,
            containers.len(),
            from_snapshot
        );

        Self {
            week,
            view,
            containers,
            lineage,
            from_snapshot,
        }
    }

    pub fn empty(week: Week, view: RotaStatus) -> Self {
        Self::build(week, view, &[], None)
    }

    pub fn week(&self) -> Week {
        self.week
    }

    pub fn view(&self) -> RotaStatus {
        self.view
    }

    pub fn is_from_snapshot(&self) -> bool {
        self.from_snapshot
    }

    pub fn rota_for(&self, date: NaiveDate) -> Option<&Rota> {
        self.containers.get(&date)
    }

    pub fn rotas(&self) -> impl Iterator<Item = &Rota> {
        self.containers.values()
    }

    /// (date, rota id) for every shown rota, in date order.
    pub fn rota_ids(&self) -> Vec<(NaiveDate, Uuid)> {
        self.containers
            .iter()
            .map(|(date, rota)| (*date, rota.id))
            .collect()
    }

    /// Included weekdays recorded on any known rota, shown or not.
    pub fn weekdays_of(&self, rota_id: Uuid) -> Option<&[Weekday]> {
        self.lineage.get(&rota_id)?.as_deref()
    }

    fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Assignment> {
        self.containers
            .get(&date)
            .into_iter()
            .flat_map(|rota| rota.assignments.iter())
    }

    /// Ward assignment whose stored range covers `slot`; full-day and
    /// slot-granular ward entries are found alike.
    pub fn ward_at(&self, date: NaiveDate, location: &str, slot: &TimeRange) -> Option<&Assignment> {
        self.on_date(date).find(|a| {
            a.assignment_type() == AssignmentType::Ward
                && a.location() == location
                && a.range().covers(slot)
        })
    }

    /// Dispensary holder for `slot`, first match wins:
    /// exact slot times, then an intersecting lunch cover, then a covering
    /// non-lunch assignment.
    pub fn dispensary_at(&self, date: NaiveDate, slot: &TimeRange) -> Option<&Assignment> {
        let dispensary: Vec<&Assignment> = self
            .on_date(date)
            .filter(|a| a.assignment_type() == AssignmentType::Dispensary && a.location() == DISPENSARY)
            .collect();

        dispensary
            .iter()
            .find(|a| a.range() == *slot)
            .or_else(|| {
                dispensary
                    .iter()
                    .find(|a| a.is_lunch_cover() && a.range().intersects(slot))
            })
            .or_else(|| {
                dispensary
                    .iter()
                    .find(|a| !a.is_lunch_cover() && a.range().covers(slot))
            })
            .copied()
    }

    /// A clinic occupies its whole configured window, so only the date and
    /// clinic name are matched.
    pub fn clinic_at(&self, date: NaiveDate, clinic: &str) -> Option<&Assignment> {
        self.on_date(date)
            .find(|a| a.assignment_type() == AssignmentType::Clinic && a.location() == clinic)
    }

    /// Every assignment shown in a cell, in display order (first is primary).
    pub fn cell_assignments(&self, location: &str, date: NaiveDate, slot: &TimeRange) -> Vec<&Assignment> {
        self.on_date(date)
            .filter(|a| a.location() == location)
            .filter(|a| {
                a.range() == *slot
                    || (a.assignment_type() == AssignmentType::Ward && a.range().covers(slot))
            })
            .collect()
    }

    /// Position of the concrete record behind a grid cell, treating a
    /// full-day entry as present in every slot of its day.
    pub fn locate(
        &self,
        pharmacist_id: Uuid,
        location: &str,
        date: NaiveDate,
        slot: &TimeRange,
    ) -> Option<(Uuid, usize)> {
        let rota = self.containers.get(&date)?;
        rota.assignments
            .iter()
            .position(|a| {
                a.pharmacist_id() == pharmacist_id
                    && a.location() == location
                    && (a.range() == *slot || a.is_full_day())
            })
            .map(|index| (rota.id, index))
    }

    pub fn assignment(&self, rota_id: Uuid, index: usize) -> Option<&Assignment> {
        self.containers
            .values()
            .find(|rota| rota.id == rota_id)?
            .assignments
            .get(index)
    }

    /// Replaces the holder of one record in the working copy.
    pub(crate) fn set_pharmacist(&mut self, rota_id: Uuid, index: usize, pharmacist_id: Uuid) -> bool {
        let Some(rota) = self.containers.values_mut().find(|rota| rota.id == rota_id) else {
            return false;
        };
        match rota.assignments.get(index) {
            Some(current) => {
                let updated = current.reassigned(pharmacist_id);
                rota.assignments[index] = updated;
                true
            }
            None => false,
        }
    }
}
