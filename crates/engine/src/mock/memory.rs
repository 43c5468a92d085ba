//! In-memory `RotaService` with the same write semantics as the database
//! service. Used by engine and API tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rota_core::{
    errors::{RotaError, RotaResult},
    models::{
        assignment::Assignment,
        pharmacist::{Clinic, Directorate, Pharmacist},
        rota::{AssignmentSlot, Rota, RotaStatus},
        time_slot::Week,
    },
    service::{GenerateRotaRequest, RotaService},
    skeleton::skeleton_rotas,
};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    pharmacists: Vec<Pharmacist>,
    clinics: Vec<Clinic>,
    directorates: Vec<Directorate>,
    rotas: Vec<Rota>,
}

impl State {
    fn rota_mut(&mut self, rota_id: Uuid) -> RotaResult<&mut Rota> {
        self.rotas
            .iter_mut()
            .find(|rota| rota.id == rota_id)
            .ok_or_else(|| RotaError::NotFound(format!("Rota {} not found", rota_id)))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRotaService {
    state: Mutex<State>,
}

impl InMemoryRotaService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pharmacists(mut self, pharmacists: Vec<Pharmacist>) -> Self {
        self.state.get_mut().pharmacists = pharmacists;
        self
    }

    pub fn with_clinics(mut self, clinics: Vec<Clinic>) -> Self {
        self.state.get_mut().clinics = clinics;
        self
    }

    pub fn with_directorates(mut self, directorates: Vec<Directorate>) -> Self {
        self.state.get_mut().directorates = directorates;
        self
    }

    pub fn with_rotas(mut self, rotas: Vec<Rota>) -> Self {
        self.state.get_mut().rotas.extend(rotas);
        self
    }

    pub async fn insert_rota(&self, rota: Rota) {
        self.state.lock().await.rotas.push(rota);
    }

    pub async fn rota(&self, rota_id: Uuid) -> Option<Rota> {
        self.state
            .lock()
            .await
            .rotas
            .iter()
            .find(|rota| rota.id == rota_id)
            .cloned()
    }

    pub async fn all_rotas(&self) -> Vec<Rota> {
        self.state.lock().await.rotas.clone()
    }
}

#[async_trait]
impl RotaService for InMemoryRotaService {
    async fn list_pharmacists(&self) -> RotaResult<Vec<Pharmacist>> {
        Ok(self.state.lock().await.pharmacists.clone())
    }

    async fn list_clinics(&self) -> RotaResult<Vec<Clinic>> {
        Ok(self.state.lock().await.clinics.clone())
    }

    async fn list_directorates(&self) -> RotaResult<Vec<Directorate>> {
        Ok(self.state.lock().await.directorates.clone())
    }

    async fn list_rotas(&self, status: RotaStatus) -> RotaResult<Vec<Rota>> {
        let state = self.state.lock().await;
        Ok(state
            .rotas
            .iter()
            .filter(|rota| rota.status == status)
            .cloned()
            .collect())
    }

    async fn generate_weekly_rota(&self, request: GenerateRotaRequest) -> RotaResult<Vec<Uuid>> {
        let week = Week::containing(request.start_date);
        let skeletons = skeleton_rotas(&request)?;
        let mut state = self.state.lock().await;

        let is_week_draft =
            |rota: &Rota| rota.status == RotaStatus::Draft && rota.week_start == week.start;
        if request.regenerate {
            state.rotas.retain(|rota| !is_week_draft(rota));
        } else if state.rotas.iter().any(is_week_draft) {
            return Err(RotaError::Conflict(format!(
                "Draft rotas already exist for week of {}",
                week.start
            )));
        }

        let ids = skeletons.iter().map(|rota| rota.id).collect();
        state.rotas.extend(skeletons);
        Ok(ids)
    }

    async fn update_rota_assignment(
        &self,
        rota_id: Uuid,
        slot: AssignmentSlot,
        pharmacist_id: Option<Uuid>,
        new_assignment: Option<Assignment>,
    ) -> RotaResult<()> {
        let mut state = self.state.lock().await;
        state
            .rota_mut(rota_id)?
            .apply_update(slot, pharmacist_id, new_assignment)?;
        debug!("Updated rota {} at {:?}", rota_id, slot);
        Ok(())
    }

    async fn publish_rota(
        &self,
        rota_id: Uuid,
        user_name: &str,
        week_start_date: NaiveDate,
    ) -> RotaResult<Vec<Uuid>> {
        let mut state = self.state.lock().await;
        let week_start = state.rota_mut(rota_id)?.week_start;
        if week_start != week_start_date {
            debug!(
                "Publish seed {} belongs to week {}, not {}",
                rota_id, week_start, week_start_date
            );
        }

        let now = Utc::now();
        let copies: Vec<Rota> = state
            .rotas
            .iter()
            .filter(|rota| rota.status == RotaStatus::Draft && rota.week_start == week_start)
            .map(|rota| rota.carbon_copy(user_name, now))
            .collect();
        let ids: Vec<Uuid> = copies.iter().map(|rota| rota.id).collect();
        state.rotas.extend(copies);

        info!("Published {} rotas for week of {}", ids.len(), week_start);
        Ok(ids)
    }

    async fn save_free_cell_text(
        &self,
        rota_id: Uuid,
        free_cell_text: BTreeMap<String, String>,
    ) -> RotaResult<()> {
        let mut state = self.state.lock().await;
        state.rota_mut(rota_id)?.free_cell_text = free_cell_text;
        Ok(())
    }
}
