//! Which stored assignments an edit touches.
//!
//! Results address assignments by position in the authoritative rota list,
//! because remote writes are positional.

use chrono::NaiveDate;
use rota_core::{
    errors::{RotaError, RotaResult},
    models::{assignment::Assignment, rota::Rota, time_slot::TimeRange},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::index::AssignmentIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Slot,
    Day,
    Week,
}

/// Positions within one rota that an edit must touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeTarget {
    pub rota_id: Uuid,
    pub date: NaiveDate,
    pub indices: Vec<usize>,
}

pub struct ScopeResolver<'a> {
    index: &'a AssignmentIndex,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(index: &'a AssignmentIndex) -> Self {
        Self { index }
    }

    /// Resolves the assignments to touch for an edit of `location`.
    ///
    /// An empty result means nothing matched and the caller has to create
    /// a new assignment (or do nothing, if a specific holder was asked for).
    pub fn resolve(
        &self,
        location: &str,
        date: NaiveDate,
        scope: Scope,
        slot: Option<&TimeRange>,
        pharmacist_id: Option<Uuid>,
    ) -> RotaResult<Vec<ScopeTarget>> {
        let targets = match scope {
            Scope::Slot => {
                let slot = slot.ok_or_else(|| {
                    RotaError::Validation("A slot edit needs a time slot".to_string())
                })?;
                self.resolve_slot(location, date, slot, pharmacist_id)
                    .into_iter()
                    .collect()
            }
            Scope::Day => self
                .resolve_day(location, date, pharmacist_id)
                .into_iter()
                .collect(),
            Scope::Week => self
                .index
                .week()
                .dates()
                .into_iter()
                .filter_map(|day| self.resolve_day(location, day, pharmacist_id))
                .collect(),
        };

        debug!(
            "Resolved {:?} scope for {} on {}: {:?}",
            scope, location, date, targets
        );
        Ok(targets)
    }

    /// Tiered slot lookup; only the first non-empty tier is used.
    fn resolve_slot(
        &self,
        location: &str,
        date: NaiveDate,
        slot: &TimeRange,
        pharmacist_id: Option<Uuid>,
    ) -> Option<ScopeTarget> {
        let rota = self.index.rota_for(date)?;
        let at_location = |a: &Assignment| a.location() == location;

        let exact = positions(rota, |a| at_location(a) && a.range() == *slot);
        if !exact.is_empty() {
            return Some(target(rota, exact));
        }

        if let Some(holder) = pharmacist_id {
            let held = first_position(rota, |a| {
                at_location(a) && a.pharmacist_id() == holder && a.range().intersects(slot)
            });
            if let Some(index) = held {
                return Some(target(rota, vec![index]));
            }
        }

        first_position(rota, |a| at_location(a) && a.range().intersects(slot))
            .map(|index| target(rota, vec![index]))
    }

    /// All entries for the location on the date; restricted to one holder
    /// when given, with no fallback to other holders.
    fn resolve_day(
        &self,
        location: &str,
        date: NaiveDate,
        pharmacist_id: Option<Uuid>,
    ) -> Option<ScopeTarget> {
        let rota = self.index.rota_for(date)?;
        let indices = positions(rota, |a| {
            a.location() == location && pharmacist_id.is_none_or(|holder| a.pharmacist_id() == holder)
        });
        (!indices.is_empty()).then(|| target(rota, indices))
    }
}

fn positions(rota: &Rota, predicate: impl Fn(&Assignment) -> bool) -> Vec<usize> {
    rota.assignments
        .iter()
        .enumerate()
        .filter(|(_, a)| predicate(*a))
        .map(|(i, _)| i)
        .collect()
}

fn first_position(rota: &Rota, predicate: impl Fn(&Assignment) -> bool) -> Option<usize> {
    rota.assignments.iter().position(predicate)
}

fn target(rota: &Rota, indices: Vec<usize>) -> ScopeTarget {
    ScopeTarget {
        rota_id: rota.id,
        date: rota.date,
        indices,
    }
}
