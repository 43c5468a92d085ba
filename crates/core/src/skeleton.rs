//! Draft rota skeletons for a generation request.
//!
//! Staffing itself is decided elsewhere; a skeleton is one empty draft per
//! selected weekday, pre-filled with the unavailability the request carries.

use chrono::Datelike;
use tracing::debug;

use crate::{
    errors::{RotaError, RotaResult},
    models::{
        assignment::Assignment,
        rota::Rota,
        time_slot::{standard_slots, Week},
    },
    service::GenerateRotaRequest,
};

pub fn skeleton_rotas(request: &GenerateRotaRequest) -> RotaResult<Vec<Rota>> {
    if request.selected_weekdays.is_empty() {
        return Err(RotaError::Validation(
            "At least one weekday must be selected".to_string(),
        ));
    }

    let week = Week::containing(request.start_date);
    let mut included = request.selected_weekdays.clone();
    included.sort_by_key(|day| day.num_days_from_monday());
    included.dedup();

    let mut rotas = Vec::with_capacity(included.len());
    for day in &included {
        let date = week.date_of(*day);
        let mut rota = Rota::draft(date, Some(included.clone()));

        let mut pharmacists: Vec<_> = request.pharmacist_ids.clone();
        pharmacists.sort();
        for pharmacist_id in pharmacists {
            let Some(rules) = request.unavailable_rules_by_pharmacist.get(&pharmacist_id) else {
                continue;
            };
            for slot in standard_slots() {
                if !rules.iter().any(|rule| rule.blocks(date.weekday(), &slot)) {
                    continue;
                }
                let assignment = Assignment::unavailable(pharmacist_id, date, slot)?;
                if !rota.assignments.iter().any(|a| a.same_identity(&assignment)) {
                    rota.push_assignment(assignment)?;
                }
            }
        }
        debug!(
            "Skeleton for {} carries {} unavailable entries",
            date,
            rota.assignments.len()
        );
        rotas.push(rota);
    }
    Ok(rotas)
}
