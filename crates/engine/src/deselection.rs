//! Per-day inclusion for the visible week.
//!
//! Once a week has been published its recorded weekdays are authoritative,
//! so a published week keeps its shape regardless of later toggle changes.
//! Precedence, first match wins:
//!
//! 1. editing a published week that records included weekdays
//! 2. the date's own rota, or the draft it was copied from
//! 3. no rota for the date: weekends off, weekdays on
//! 4. the session's weekday toggles

use chrono::{Datelike, NaiveDate};
use rota_core::models::time_slot::is_weekend;

use crate::{index::AssignmentIndex, session::EditSession};

pub struct DeselectionResolver<'a> {
    session: &'a EditSession,
    index: &'a AssignmentIndex,
}

impl<'a> DeselectionResolver<'a> {
    pub fn new(session: &'a EditSession, index: &'a AssignmentIndex) -> Self {
        Self { session, index }
    }

    pub fn is_day_active(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();

        if let Some(days) = self.session.published_weekdays() {
            return days.contains(&weekday);
        }

        let Some(rota) = self.index.rota_for(date) else {
            return !is_weekend(weekday);
        };

        let recorded = rota.included_weekdays.as_deref().or_else(|| {
            rota.original_rota_id
                .and_then(|original| self.index.weekdays_of(original))
        });
        if let Some(days) = recorded {
            return days.contains(&weekday);
        }

        self.session.selected_weekdays.contains(&weekday)
    }

    pub fn active_dates(&self) -> Vec<NaiveDate> {
        self.index
            .week()
            .dates()
            .into_iter()
            .filter(|date| self.is_day_active(*date))
            .collect()
    }
}
