#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc, Weekday};
use rota_core::models::{
    assignment::Assignment,
    availability::AvailabilityRule,
    pharmacist::{Band, Pharmacist},
    rota::Rota,
    time_slot::{default_weekdays, TimeRange, Week},
};
use uuid::Uuid;

/// Monday 3 June 2024.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn week() -> Week {
    Week::containing(monday())
}

pub fn day(offset: i64) -> NaiveDate {
    monday() + Duration::days(offset)
}

pub fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::parse(start, end).unwrap()
}

pub fn pharmacist(name: &str) -> Pharmacist {
    Pharmacist {
        id: Uuid::new_v4(),
        name: name.to_string(),
        display_name: None,
        band: Band::Band7,
        working_days: default_weekdays(),
        is_default_pharmacist: false,
        not_available_rules: Vec::new(),
    }
}

pub fn with_rule(mut pharmacist: Pharmacist, day: Weekday, start: &str, end: &str) -> Pharmacist {
    pharmacist
        .not_available_rules
        .push(AvailabilityRule::new(day, start, end).unwrap());
    pharmacist
}

pub fn draft(date: NaiveDate, assignments: Vec<Assignment>) -> Rota {
    let mut rota = Rota::draft(date, None);
    for assignment in assignments {
        rota.push_assignment(assignment).unwrap();
    }
    rota
}

pub fn published(date: NaiveDate, included: &[Weekday], assignments: Vec<Assignment>) -> Rota {
    let mut rota = draft(date, assignments);
    rota.included_weekdays = Some(included.to_vec());
    rota.carbon_copy("Ward Manager", Utc::now())
}

pub fn ward(location: &str, pharmacist_id: Uuid, date: NaiveDate, slot: TimeRange) -> Assignment {
    Assignment::ward(location, pharmacist_id, date, slot).unwrap()
}

pub fn dispensary(pharmacist_id: Uuid, date: NaiveDate, slot: TimeRange, lunch_cover: bool) -> Assignment {
    Assignment::dispensary(pharmacist_id, date, slot, lunch_cover).unwrap()
}
