//! Explicit per-editing-session state.
//!
//! Everything the grid needs beyond remote data lives here: the visible
//! week, weekday toggles, session-only rule overrides, free-text cell
//! overrides, and (when editing an already published week) the injected
//! snapshot that shadows remote rotas.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::Weekday;
use rota_core::{
    errors::{RotaError, RotaResult},
    models::{
        availability::{AvailabilityRule, RuleId},
        pharmacist::Pharmacist,
        rota::{Rota, RotaStatus},
        time_slot::{default_weekdays, Week},
    },
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Session-only adjustments to one pharmacist's permanent rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOverrides {
    #[serde(default)]
    pub ad_hoc: Vec<AvailabilityRule>,
    #[serde(default)]
    pub ignored: BTreeSet<RuleId>,
}

impl RuleOverrides {
    pub fn add_ad_hoc(&mut self, rule: AvailabilityRule) {
        self.ad_hoc.push(rule);
    }

    /// Idempotent: ignoring an already ignored rule changes nothing.
    pub fn set_ignored(&mut self, id: RuleId, ignored: bool) {
        if ignored {
            self.ignored.insert(id);
        } else {
            self.ignored.remove(&id);
        }
    }

    /// Ignores a permanent rule by its position in the pharmacist's list.
    ///
    /// The position is resolved to the rule's id immediately, so later
    /// edits to the list cannot redirect the override to another rule.
    pub fn set_ignored_at(
        &mut self,
        pharmacist: &Pharmacist,
        index: usize,
        ignored: bool,
    ) -> RotaResult<()> {
        let rule = pharmacist.not_available_rules.get(index).ok_or_else(|| {
            RotaError::NotFound(format!(
                "Pharmacist {} has no permanent rule at index {}",
                pharmacist.id, index
            ))
        })?;
        self.set_ignored(rule.id, ignored);
        Ok(())
    }

    pub fn is_ignored(&self, id: RuleId) -> bool {
        self.ignored.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ad_hoc.is_empty() && self.ignored.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub week: Week,
    pub view: RotaStatus,
    #[serde(default)]
    published_snapshot: Option<Vec<Rota>>,
    pub selected_weekdays: HashSet<Weekday>,
    #[serde(default)]
    pub rule_overrides: HashMap<Uuid, RuleOverrides>,
    #[serde(default)]
    pub free_cell_text: BTreeMap<String, String>,
    #[serde(default)]
    pub selected_pharmacists: Vec<Uuid>,
    #[serde(default)]
    pub selected_clinics: Vec<Uuid>,
    #[serde(default)]
    pub working_days: HashMap<Uuid, Vec<Weekday>>,
    #[serde(default)]
    pub single_pharmacist_dispensary_days: HashSet<Weekday>,
}

impl EditSession {
    /// A fresh session over the draft rotas of `week`.
    pub fn new(week: Week) -> Self {
        Self {
            week,
            view: RotaStatus::Draft,
            published_snapshot: None,
            selected_weekdays: default_weekdays().into_iter().collect(),
            rule_overrides: HashMap::new(),
            free_cell_text: BTreeMap::new(),
            selected_pharmacists: Vec::new(),
            selected_clinics: Vec::new(),
            working_days: HashMap::new(),
            single_pharmacist_dispensary_days: HashSet::new(),
        }
    }

    /// A session editing an already published week.
    ///
    /// The published rotas are injected as a snapshot that takes precedence
    /// over remote data for as long as the session lives.
    pub fn editing_published(week: Week, published: Vec<Rota>) -> Self {
        let mut session = Self::new(week);
        session.view = RotaStatus::Published;
        session.seed_free_cell_text(&published);
        if let Some(days) = published.iter().find_map(|rota| rota.included_weekdays.clone()) {
            session.selected_weekdays = days.into_iter().collect();
        }
        session.published_snapshot = Some(published);
        session
    }

    pub fn snapshot(&self) -> Option<&[Rota]> {
        self.published_snapshot.as_deref()
    }

    pub fn replace_snapshot(&mut self, rotas: Vec<Rota>) {
        self.published_snapshot = Some(rotas);
    }

    /// Weekdays recorded on the published week being edited, if any.
    pub fn published_weekdays(&self) -> Option<&[Weekday]> {
        self.published_snapshot
            .as_ref()?
            .iter()
            .find_map(|rota| rota.included_weekdays.as_deref())
    }

    pub fn toggle_weekday(&mut self, day: Weekday) -> bool {
        if !self.selected_weekdays.remove(&day) {
            self.selected_weekdays.insert(day);
        }
        self.selected_weekdays.contains(&day)
    }

    /// Selected weekdays in Monday-first order.
    pub fn ordered_weekdays(&self) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = self.selected_weekdays.iter().copied().collect();
        days.sort_by_key(|day| day.num_days_from_monday());
        days
    }

    pub fn overrides_for(&self, pharmacist_id: Uuid) -> Option<&RuleOverrides> {
        self.rule_overrides.get(&pharmacist_id)
    }

    pub fn overrides_mut(&mut self, pharmacist_id: Uuid) -> &mut RuleOverrides {
        self.rule_overrides.entry(pharmacist_id).or_default()
    }

    pub fn working_days_for(&self, pharmacist: &Pharmacist) -> Vec<Weekday> {
        self.working_days
            .get(&pharmacist.id)
            .cloned()
            .unwrap_or_else(|| pharmacist.working_days.clone())
    }

    /// Copies free-text overrides from rotas into the session; session
    /// entries win on key collisions.
    pub fn seed_free_cell_text(&mut self, rotas: &[Rota]) {
        let week = self.week;
        for rota in rotas.iter().filter(|rota| week.contains(rota.date)) {
            for (key, text) in &rota.free_cell_text {
                self.free_cell_text
                    .entry(key.clone())
                    .or_insert_with(|| text.clone());
            }
        }
    }

    pub fn set_free_cell_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        let key = key.into();
        if text.trim().is_empty() {
            self.free_cell_text.remove(&key);
        } else {
            self.free_cell_text.insert(key, text);
        }
    }

    pub fn persist(&self) -> RotaResult<String> {
        serde_json::to_string(self).map_err(|e| RotaError::Internal(Box::new(e)))
    }

    /// Restores a cached session, discarding it if the payload is corrupt.
    pub fn restore(raw: Option<&str>) -> Option<Self> {
        restore_cached(raw, "edit session")
    }
}

/// Identity recorded on published rotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
}

impl Actor {
    /// Restores a cached actor; a corrupt payload counts as signed out.
    pub fn restore(raw: Option<&str>) -> Option<Self> {
        restore_cached::<Actor>(raw, "actor").filter(|actor| !actor.name.trim().is_empty())
    }
}

fn restore_cached<T: DeserializeOwned>(raw: Option<&str>, what: &str) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Discarding corrupt cached {}: {}", what, err);
            None
        }
    }
}
