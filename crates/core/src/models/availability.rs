use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RotaResult;
use crate::models::time_slot::{hhmm, TimeRange};

/// Stable identity of an unavailability rule.
///
/// Session overrides refer to permanent rules by this id, so edits to a
/// pharmacist's rule list never shift which rule is ignored. Rules stored
/// without an id read back as the nil id until their owner assigns a
/// derived one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RuleId(pub Uuid);

impl RuleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Same owner, position, day and times always give the same id.
    pub fn derived(owner: Uuid, position: usize, rule: &AvailabilityRule) -> Self {
        let name = format!(
            "{}:{}:{}-{}",
            position,
            rule.day_of_week,
            rule.start_time.format("%H:%M"),
            rule.end_time.format("%H:%M")
        );
        Self(Uuid::new_v5(&owner, name.as_bytes()))
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.is_nil()
    }
}

/// Gives every rule stored without an id its derived id, so re-reading the
/// same roster yields the same identities.
pub fn assign_stable_ids(owner: Uuid, rules: &mut [AvailabilityRule]) {
    for (position, rule) in rules.iter_mut().enumerate() {
        if !rule.id.is_assigned() {
            rule.id = RuleId::derived(owner, position, rule);
        }
    }
}

/// Recurring protected time on one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRule {
    #[serde(default)]
    pub id: RuleId,
    pub day_of_week: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: chrono::NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: chrono::NaiveTime,
}

impl AvailabilityRule {
    pub fn new(day_of_week: Weekday, start: &str, end: &str) -> RotaResult<Self> {
        let range = TimeRange::parse(start, end)?;
        Ok(Self {
            id: RuleId::new(),
            day_of_week,
            start_time: range.start,
            end_time: range.end,
        })
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// True when the rule falls on `day` and overlaps `slot`.
    pub fn blocks(&self, day: Weekday, slot: &TimeRange) -> bool {
        self.day_of_week == day && self.range().intersects(slot)
    }
}
