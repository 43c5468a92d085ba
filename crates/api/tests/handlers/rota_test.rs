use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rota_core::{errors::RotaError, models::rota::RotaStatus};
use rota_engine::mock::{memory::InMemoryRotaService, MockRotaRemote};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{draft, monday, pharmacist, server_with, ward, TestContext};

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new(InMemoryRotaService::new());

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");

    ctx.server.get("/version").await.assert_status_ok();
}

#[tokio::test]
async fn test_list_pharmacists() {
    let alice = pharmacist("Alice");
    let ctx = TestContext::new(InMemoryRotaService::new().with_pharmacists(vec![alice.clone()]));

    let response = ctx.server.get("/api/pharmacists").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], json!(alice.id));
    assert_eq!(body[0]["band"], "7");
}

#[tokio::test]
async fn test_list_rotas_filters_by_status() {
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![draft(monday(), vec![])]));

    let drafts = ctx.server.get("/api/rotas").await.json::<Value>();
    let published = ctx
        .server
        .get("/api/rotas")
        .add_query_param("status", "published")
        .await
        .json::<Value>();

    assert_eq!(drafts.as_array().unwrap().len(), 1);
    assert_eq!(drafts[0]["status"], "draft");
    assert!(published.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_week_then_conflict_without_regenerate() {
    let alice = pharmacist("Alice");
    let ctx = TestContext::new(InMemoryRotaService::new().with_pharmacists(vec![alice.clone()]));
    let body = json!({
        "startDate": "2024-06-03",
        "pharmacistIds": [alice.id],
        "selectedWeekdays": ["Mon", "Tue", "Wed", "Thu", "Fri"],
    });

    let first = ctx.server.post("/api/rotas/generate").json(&body).await;
    first.assert_status(StatusCode::CREATED);
    assert_eq!(first.json::<Value>()["rotaIds"].as_array().unwrap().len(), 5);

    let second = ctx.server.post("/api/rotas/generate").json(&body).await;
    second.assert_status(StatusCode::CONFLICT);

    let mut regenerate = body.clone();
    regenerate["regenerate"] = json!(true);
    let third = ctx.server.post("/api/rotas/generate").json(&regenerate).await;
    third.assert_status(StatusCode::CREATED);
    assert_eq!(ctx.service.all_rotas().await.len(), 5);
}

#[tokio::test]
async fn test_generate_requires_a_pharmacist() {
    let ctx = TestContext::new(InMemoryRotaService::new());

    let response = ctx
        .server
        .post("/api/rotas/generate")
        .json(&json!({
            "startDate": "2024-06-03",
            "pharmacistIds": [],
            "selectedWeekdays": ["Mon"],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_assignment_replaces_pharmacist() {
    let alice = pharmacist("Alice");
    let bob = pharmacist("Bob");
    let rota = draft(monday(), vec![ward("Ward 1", alice.id, monday())]);
    let rota_id = rota.id;
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![rota]));

    let response = ctx
        .server
        .put(&format!("/api/rotas/{}/assignments", rota_id))
        .json(&json!({ "assignmentIndex": 0, "pharmacistId": bob.id }))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    let stored = ctx.service.rota(rota_id).await.unwrap();
    assert_eq!(stored.assignments[0].pharmacist_id(), bob.id);
}

#[tokio::test]
async fn test_update_unknown_rota_is_not_found() {
    let ctx = TestContext::new(InMemoryRotaService::new());

    let response = ctx
        .server
        .put(&format!("/api/rotas/{}/assignments", Uuid::new_v4()))
        .json(&json!({ "assignmentIndex": 0, "pharmacistId": Uuid::new_v4() }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_publish_rota_copies_week_drafts() {
    let monday_rota = draft(monday(), vec![]);
    let tuesday_rota = draft(monday().succ_opt().unwrap(), vec![]);
    let seed = monday_rota.id;
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![monday_rota, tuesday_rota]));

    let response = ctx
        .server
        .post(&format!("/api/rotas/{}/publish", seed))
        .json(&json!({ "userName": "Ward Manager", "weekStartDate": "2024-06-03" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["publishedRotaIds"].as_array().unwrap().len(),
        2
    );
    let published: Vec<_> = ctx
        .service
        .all_rotas()
        .await
        .into_iter()
        .filter(|rota| rota.status == RotaStatus::Published)
        .collect();
    assert!(published.iter().all(|rota| rota.published_by.as_deref() == Some("Ward Manager")));
}

#[tokio::test]
async fn test_publish_rota_requires_user_name() {
    let rota = draft(monday(), vec![]);
    let seed = rota.id;
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![rota]));

    let response = ctx
        .server
        .post(&format!("/api/rotas/{}/publish", seed))
        .json(&json!({ "userName": "  ", "weekStartDate": "2024-06-03" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_free_cell_text() {
    let rota = draft(monday(), vec![]);
    let rota_id = rota.id;
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![rota]));

    ctx.server
        .put(&format!("/api/rotas/{}/free-cell-text", rota_id))
        .json(&json!({ "Management Time-2024-06-03": "Audit" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stored = ctx.service.rota(rota_id).await.unwrap();
    assert_eq!(
        stored.free_cell_text.get("Management Time-2024-06-03").map(String::as_str),
        Some("Audit")
    );
}

#[test_log::test(tokio::test)]
async fn test_remote_failure_is_internal_error() {
    let mut remote = MockRotaRemote::new();
    remote
        .expect_list_clinics()
        .times(1)
        .returning(|| Err(RotaError::Database(eyre::eyre!("connection refused"))));
    let server = server_with(Arc::new(remote));

    let response = server.get("/api/clinics").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["error"],
        "Database error: connection refused"
    );
}
