use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rota_core::models::{assignment::AssignmentType, rota::RotaStatus};
use rota_engine::mock::memory::InMemoryRotaService;
use serde_json::{json, Value};

use crate::test_utils::{draft, monday, pharmacist, ward, TestContext};

#[tokio::test]
async fn test_days_report_activity_and_rotas() {
    let rota = draft(monday(), vec![]);
    let rota_id = rota.id;
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![rota]));

    let response = ctx.server.get("/api/weeks/2024-06-03/days").await;

    response.assert_status_ok();
    let days = response.json::<Value>();
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["rotaId"], json!(rota_id));
    assert_eq!(days[0]["active"], true);
    assert_eq!(days[5]["weekday"], "Sat");
    assert_eq!(days[5]["active"], false);
}

#[tokio::test]
async fn test_published_view_of_unpublished_week_is_not_found() {
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![draft(monday(), vec![])]));

    let response = ctx
        .server
        .get("/api/weeks/2024-06-03/days")
        .add_query_param("view", "published")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_day_clear_removes_ward_entry() {
    let alice = pharmacist("Alice");
    let rota = draft(monday(), vec![ward("Ward 1", alice.id, monday())]);
    let rota_id = rota.id;
    let ctx = TestContext::new(
        InMemoryRotaService::new()
            .with_pharmacists(vec![alice])
            .with_rotas(vec![rota]),
    );

    let response = ctx
        .server
        .post("/api/weeks/2024-06-03/edits")
        .json(&json!({
            "edit": {
                "assignmentType": "ward",
                "location": "Ward 1",
                "date": "2024-06-03",
                "slot": { "start": "09:00", "end": "11:00" },
                "scope": "day",
                "action": { "action": "clear" }
            }
        }))
        .await;

    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["applied"].as_array().unwrap().len(), 1);
    assert!(report["failed"].is_null());
    assert!(ctx.service.rota(rota_id).await.unwrap().assignments.is_empty());
}

#[tokio::test]
async fn test_swap_exchanges_ward_holders() {
    let alice = pharmacist("Alice");
    let bob = pharmacist("Bob");
    let rota = draft(
        monday(),
        vec![
            ward("Ward A", alice.id, monday()),
            ward("Ward B", bob.id, monday()),
        ],
    );
    let rota_id = rota.id;
    let ctx = TestContext::new(
        InMemoryRotaService::new()
            .with_pharmacists(vec![alice.clone(), bob.clone()])
            .with_rotas(vec![rota]),
    );
    let slot = json!({ "start": "09:00", "end": "11:00" });

    let response = ctx
        .server
        .post("/api/weeks/2024-06-03/swap")
        .json(&json!({
            "source": { "location": "Ward A", "date": "2024-06-03", "slot": slot, "pharmacistId": alice.id },
            "target": { "location": "Ward B", "date": "2024-06-03", "slot": slot, "pharmacistId": bob.id }
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["outcome"], "swapped");
    let stored = ctx.service.rota(rota_id).await.unwrap();
    let holder = |location: &str| {
        stored
            .assignments
            .iter()
            .find(|a| a.assignment_type() == AssignmentType::Ward && a.location() == location)
            .map(|a| a.pharmacist_id())
    };
    assert_eq!(holder("Ward A"), Some(bob.id));
    assert_eq!(holder("Ward B"), Some(alice.id));
}

#[tokio::test]
async fn test_swap_from_empty_cell_is_rejected() {
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![draft(monday(), vec![])]));
    let slot = json!({ "start": "09:00", "end": "11:00" });

    let response = ctx
        .server
        .post("/api/weeks/2024-06-03/swap")
        .json(&json!({
            "source": { "location": "Ward A", "date": "2024-06-03", "slot": slot },
            "target": { "location": "Ward B", "date": "2024-06-03", "slot": slot }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_publish_week_attaches_free_text_by_date() {
    let tuesday = monday().succ_opt().unwrap();
    let ctx = TestContext::new(
        InMemoryRotaService::new().with_rotas(vec![draft(monday(), vec![]), draft(tuesday, vec![])]),
    );

    let response = ctx
        .server
        .post("/api/weeks/2024-06-03/publish")
        .json(&json!({
            "userName": "Ward Manager",
            "freeCellText": {
                "Management Time-2024-06-04": "Audit",
                "not a key": "dropped"
            }
        }))
        .await;

    response.assert_status_ok();
    let outcome = response.json::<Value>();
    assert_eq!(outcome["publishedRotaIds"].as_array().unwrap().len(), 2);
    assert_eq!(outcome["discardedKeys"], json!(["not a key"]));

    let rotas = ctx.service.all_rotas().await;
    let tuesday_published = rotas
        .iter()
        .find(|rota| rota.status == RotaStatus::Published && rota.date == tuesday)
        .unwrap();
    assert_eq!(
        tuesday_published.free_cell_text.get("Management Time-2024-06-04").map(String::as_str),
        Some("Audit")
    );
}

#[tokio::test]
async fn test_publish_week_requires_user_name() {
    let ctx = TestContext::new(InMemoryRotaService::new().with_rotas(vec![draft(monday(), vec![])]));

    let response = ctx
        .server
        .post("/api/weeks/2024-06-03/publish")
        .json(&json!({ "userName": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
