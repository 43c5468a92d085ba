use std::sync::Arc;

use axum_test::TestServer;
use chrono::NaiveDate;
use rota_api::ApiState;
use rota_core::{
    models::{
        assignment::Assignment,
        pharmacist::{Band, Pharmacist},
        rota::Rota,
        time_slot::{default_weekdays, TimeRange},
    },
    service::RotaService,
};
use rota_engine::mock::memory::InMemoryRotaService;
use uuid::Uuid;

pub struct TestContext {
    pub service: Arc<InMemoryRotaService>,
    pub server: TestServer,
}

/// Server over an arbitrary remote, for failure injection.
pub fn server_with(remote: Arc<dyn RotaService>) -> TestServer {
    TestServer::new(rota_api::app(Arc::new(ApiState::new(remote)))).unwrap()
}

impl TestContext {
    pub fn new(service: InMemoryRotaService) -> Self {
        let service = Arc::new(service);
        let remote: Arc<dyn RotaService> = service.clone();
        let app = rota_api::app(Arc::new(ApiState::new(remote)));
        Self {
            service,
            server: TestServer::new(app).unwrap(),
        }
    }
}

/// Monday 3 June 2024.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
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

pub fn ward(location: &str, pharmacist_id: Uuid, date: NaiveDate) -> Assignment {
    Assignment::ward(location, pharmacist_id, date, TimeRange::full_day()).unwrap()
}

pub fn draft(date: NaiveDate, assignments: Vec<Assignment>) -> Rota {
    let mut rota = Rota::draft(date, None);
    for assignment in assignments {
        rota.push_assignment(assignment).unwrap();
    }
    rota
}
