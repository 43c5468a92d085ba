//! Requesting server-side rota generation for the session's week.
//!
//! Only one generation may be outstanding at a time. A second request while
//! one is running is rejected, not queued.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rota_core::{
    errors::{RotaError, RotaResult},
    models::pharmacist::Pharmacist,
    service::{GenerateRotaRequest, RotaService},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{availability::AvailabilityResolver, session::EditSession};

/// Shared "generation in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct GenerationGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one generation; releases the guard on drop.
#[derive(Debug)]
pub struct GenerationTicket {
    busy: Arc<AtomicBool>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<GenerationTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationTicket {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GenerationTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Builds the generation request from the session's selections, with every
/// selected pharmacist's rules fully resolved.
pub fn build_request(
    session: &EditSession,
    pharmacists: &[Pharmacist],
    regenerate: bool,
) -> RotaResult<GenerateRotaRequest> {
    if session.selected_pharmacists.is_empty() {
        return Err(RotaError::Validation(
            "Select at least one pharmacist to generate a rota".to_string(),
        ));
    }
    let selected_weekdays = session.ordered_weekdays();
    if selected_weekdays.is_empty() {
        return Err(RotaError::Validation(
            "Select at least one weekday to generate a rota".to_string(),
        ));
    }

    let selected: Vec<&Pharmacist> = pharmacists
        .iter()
        .filter(|p| session.selected_pharmacists.contains(&p.id))
        .collect();
    let resolver = AvailabilityResolver::new(session);

    let mut single_days: Vec<_> = session.single_pharmacist_dispensary_days.iter().copied().collect();
    single_days.sort_by_key(|day| day.num_days_from_monday());

    Ok(GenerateRotaRequest {
        start_date: session.week.start,
        pharmacist_ids: session.selected_pharmacists.clone(),
        clinic_ids: session.selected_clinics.clone(),
        working_days_by_pharmacist: selected
            .iter()
            .map(|p| (p.id, session.working_days_for(p)))
            .collect(),
        single_pharmacist_dispensary_days: single_days,
        regenerate,
        unavailable_rules_by_pharmacist: resolver.resolved_rules(selected.iter().copied()),
        selected_weekdays,
    })
}

pub async fn generate<S: RotaService + ?Sized>(
    guard: &GenerationGuard,
    service: &S,
    session: &EditSession,
    pharmacists: &[Pharmacist],
    regenerate: bool,
) -> RotaResult<Vec<Uuid>> {
    let Some(_ticket) = guard.try_begin() else {
        warn!(
            "Rota generation for week of {} rejected: another generation is in progress",
            session.week.start
        );
        return Err(RotaError::Conflict(
            "A rota generation is already in progress".to_string(),
        ));
    };

    let request = build_request(session, pharmacists, regenerate)?;
    info!(
        "Generating rotas for week of {} ({} pharmacists, regenerate: {})",
        request.start_date,
        request.pharmacist_ids.len(),
        regenerate
    );
    service.generate_weekly_rota(request).await
}
