use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use rota_core::{
    errors::RotaResult,
    models::{
        assignment::Assignment,
        pharmacist::{Clinic, Directorate, Pharmacist},
        rota::{AssignmentSlot, Rota, RotaStatus},
    },
    service::{GenerateRotaRequest, RotaService},
};
use uuid::Uuid;

pub mod memory;

// Mock collaborator for failure injection in tests
mock! {
    pub RotaRemote {}

    #[async_trait]
    impl RotaService for RotaRemote {
        async fn list_pharmacists(&self) -> RotaResult<Vec<Pharmacist>>;

        async fn list_clinics(&self) -> RotaResult<Vec<Clinic>>;

        async fn list_directorates(&self) -> RotaResult<Vec<Directorate>>;

        async fn list_rotas(&self, status: RotaStatus) -> RotaResult<Vec<Rota>>;

        async fn generate_weekly_rota(&self, request: GenerateRotaRequest) -> RotaResult<Vec<Uuid>>;

        async fn update_rota_assignment(
            &self,
            rota_id: Uuid,
            slot: AssignmentSlot,
            pharmacist_id: Option<Uuid>,
            new_assignment: Option<Assignment>,
        ) -> RotaResult<()>;

        async fn publish_rota(
            &self,
            rota_id: Uuid,
            user_name: &str,
            week_start_date: NaiveDate,
        ) -> RotaResult<Vec<Uuid>>;

        async fn save_free_cell_text(
            &self,
            rota_id: Uuid,
            free_cell_text: BTreeMap<String, String>,
        ) -> RotaResult<()>;
    }
}
