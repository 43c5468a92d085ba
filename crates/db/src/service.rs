//! PostgreSQL-backed `RotaService`.

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
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    repositories::{pharmacist, reference, rota as rota_repo},
    DbPool,
};

fn db_error(err: sqlx::Error) -> RotaError {
    RotaError::Database(err.into())
}

#[derive(Debug, Clone)]
pub struct PgRotaService {
    pool: DbPool,
}

impl PgRotaService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RotaService for PgRotaService {
    async fn list_pharmacists(&self) -> RotaResult<Vec<Pharmacist>> {
        Ok(pharmacist::list_pharmacists(&self.pool).await?)
    }

    async fn list_clinics(&self) -> RotaResult<Vec<Clinic>> {
        Ok(reference::list_clinics(&self.pool).await?)
    }

    async fn list_directorates(&self) -> RotaResult<Vec<Directorate>> {
        Ok(reference::list_directorates(&self.pool).await?)
    }

    async fn list_rotas(&self, status: RotaStatus) -> RotaResult<Vec<Rota>> {
        Ok(rota_repo::list_rotas_by_status(&self.pool, status).await?)
    }

    async fn generate_weekly_rota(&self, request: GenerateRotaRequest) -> RotaResult<Vec<Uuid>> {
        let week = Week::containing(request.start_date);
        let skeletons = skeleton_rotas(&request)?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let existing = rota_repo::lock_week_drafts(&mut tx, week.start).await?;
        if !existing.is_empty() {
            if !request.regenerate {
                warn!("Draft rotas already exist for week of {}", week.start);
                return Err(RotaError::Conflict(format!(
                    "Draft rotas already exist for week of {}",
                    week.start
                )));
            }
            let removed = rota_repo::delete_week_drafts(&mut tx, week.start).await?;
            debug!("Removed {} draft rotas for week of {}", removed, week.start);
        }

        for rota in &skeletons {
            rota_repo::insert_rota(&mut tx, rota).await?;
        }
        tx.commit().await.map_err(db_error)?;

        info!(
            "Generated {} draft rotas for week of {}",
            skeletons.len(),
            week.start
        );
        Ok(skeletons.into_iter().map(|rota| rota.id).collect())
    }

    async fn update_rota_assignment(
        &self,
        rota_id: Uuid,
        slot: AssignmentSlot,
        pharmacist_id: Option<Uuid>,
        new_assignment: Option<Assignment>,
    ) -> RotaResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let mut rota = rota_repo::lock_rota(&mut tx, rota_id)
            .await?
            .ok_or_else(|| RotaError::NotFound(format!("Rota {} not found", rota_id)))?;

        rota.apply_update(slot, pharmacist_id, new_assignment)?;
        rota_repo::update_assignments(&mut tx, rota_id, &rota.assignments).await?;
        tx.commit().await.map_err(db_error)?;

        debug!("Updated rota {} at {:?}", rota_id, slot);
        Ok(())
    }

    async fn publish_rota(
        &self,
        rota_id: Uuid,
        user_name: &str,
        week_start_date: NaiveDate,
    ) -> RotaResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let seed = rota_repo::lock_rota(&mut tx, rota_id)
            .await?
            .ok_or_else(|| RotaError::NotFound(format!("Rota {} not found", rota_id)))?;
        if seed.week_start != week_start_date {
            debug!(
                "Publish seed {} belongs to week {}, not {}",
                rota_id, seed.week_start, week_start_date
            );
        }

        let drafts = rota_repo::lock_week_drafts(&mut tx, seed.week_start).await?;
        let now = Utc::now();
        let mut published = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            let copy = draft.carbon_copy(user_name, now);
            rota_repo::insert_rota(&mut tx, &copy).await?;
            published.push(copy.id);
        }
        tx.commit().await.map_err(db_error)?;

        info!(
            "{} published {} rotas for week of {}",
            user_name,
            published.len(),
            seed.week_start
        );
        Ok(published)
    }

    async fn save_free_cell_text(
        &self,
        rota_id: Uuid,
        free_cell_text: BTreeMap<String, String>,
    ) -> RotaResult<()> {
        let updated = rota_repo::update_free_cell_text(&self.pool, rota_id, &free_cell_text).await?;
        if !updated {
            return Err(RotaError::NotFound(format!("Rota {} not found", rota_id)));
        }
        Ok(())
    }
}
