//! Effective unavailability for a pharmacist.
//!
//! Permanent rules come from the staff roster and are never mutated; the
//! session may hide some of them and add ad-hoc rules of its own. The
//! effective list is the permanent rules minus ignored ones, followed by
//! the ad-hoc rules.

use std::collections::HashMap;

use chrono::Weekday;
use rota_core::models::{
    availability::AvailabilityRule, pharmacist::Pharmacist, time_slot::TimeRange,
};
use uuid::Uuid;

use crate::session::{EditSession, RuleOverrides};

pub fn effective_rules(
    pharmacist: &Pharmacist,
    overrides: Option<&RuleOverrides>,
) -> Vec<AvailabilityRule> {
    let permanent = pharmacist
        .not_available_rules
        .iter()
        .filter(|rule| overrides.is_none_or(|o| !o.is_ignored(rule.id)));
    let ad_hoc = overrides.into_iter().flat_map(|o| o.ad_hoc.iter());

    permanent.chain(ad_hoc).cloned().collect()
}

pub fn is_unavailable(
    pharmacist: &Pharmacist,
    day: Weekday,
    slot: &TimeRange,
    overrides: Option<&RuleOverrides>,
) -> bool {
    effective_rules(pharmacist, overrides)
        .iter()
        .any(|rule| rule.blocks(day, slot))
}

/// Resolves availability against the overrides held by one session.
pub struct AvailabilityResolver<'a> {
    session: &'a EditSession,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(session: &'a EditSession) -> Self {
        Self { session }
    }

    pub fn effective_rules(&self, pharmacist: &Pharmacist) -> Vec<AvailabilityRule> {
        effective_rules(pharmacist, self.session.overrides_for(pharmacist.id))
    }

    pub fn is_unavailable(&self, pharmacist: &Pharmacist, day: Weekday, slot: &TimeRange) -> bool {
        is_unavailable(
            pharmacist,
            day,
            slot,
            self.session.overrides_for(pharmacist.id),
        )
    }

    /// Fully resolved rules for every given pharmacist, as sent to rota
    /// generation.
    pub fn resolved_rules<'p>(
        &self,
        pharmacists: impl IntoIterator<Item = &'p Pharmacist>,
    ) -> HashMap<Uuid, Vec<AvailabilityRule>> {
        pharmacists
            .into_iter()
            .map(|pharmacist| (pharmacist.id, self.effective_rules(pharmacist)))
            .collect()
    }
}
