mod common;

use std::{collections::BTreeMap, sync::Arc};

use chrono::Weekday;
use pretty_assertions::assert_eq;
use rota_core::{
    errors::RotaError,
    models::{
        assignment::AssignmentType,
        rota::{AssignmentSlot, RotaStatus},
        time_slot::TimeRange,
    },
    service::RotaService,
};
use rota_engine::{
    generation::{build_request, generate, GenerationGuard},
    index::AssignmentIndex,
    mock::{memory::InMemoryRotaService, MockRotaRemote},
    publish::{partition_free_cell_text, publish},
    session::{Actor, EditSession},
    swap::{SwapCell, SwapOutcome, SwapProtocol, SwapState},
    RotaEditor,
};
use uuid::Uuid;

use common::*;

fn cell(location: &str, slot: TimeRange, pharmacist_id: Uuid) -> SwapCell {
    SwapCell {
        location: location.to_string(),
        date: monday(),
        slot,
        pharmacist_id: Some(pharmacist_id),
    }
}

#[test]
fn test_swap_gesture_states() {
    let mut swap = SwapProtocol::new();
    let slot = range("09:00", "11:00");
    let source = cell("Ward 1", slot, Uuid::new_v4());
    let empty = SwapCell {
        pharmacist_id: None,
        ..cell("Ward 2", slot, Uuid::new_v4())
    };

    assert!(matches!(swap.arm(empty.clone()), Err(RotaError::Validation(_))));
    swap.arm(source.clone()).unwrap();

    swap.hover(empty);
    assert!(matches!(swap.state(), SwapState::Armed { .. }));
    swap.hover(source.clone());
    assert!(matches!(swap.state(), SwapState::Armed { .. }));

    let target = cell("Dispensary", slot, Uuid::new_v4());
    swap.hover(target.clone());
    assert_eq!(
        swap.state(),
        &SwapState::Targeted {
            source: source.clone(),
            target
        }
    );
    swap.leave();
    assert_eq!(swap.state(), &SwapState::Armed { source });
    swap.cancel();
    assert_eq!(swap.state(), &SwapState::Idle);
}

#[test_log::test(tokio::test)]
async fn test_swapping_twice_restores_original_cells() {
    let a = pharmacist("Amir");
    let b = pharmacist("Bea");
    let slot = range("09:00", "11:00");
    let rota = draft(
        monday(),
        vec![
            ward("Ward 1", a.id, monday(), TimeRange::full_day()),
            dispensary(b.id, monday(), slot, false),
        ],
    );
    let rota_id = rota.id;
    let service = Arc::new(
        InMemoryRotaService::new()
            .with_pharmacists(vec![a.clone(), b.clone()])
            .with_rotas(vec![rota.clone()]),
    );
    let mut editor = RotaEditor::load(service.clone(), EditSession::new(week()), GenerationGuard::new())
        .await
        .unwrap();

    editor.arm_swap(cell("Ward 1", slot, a.id)).unwrap();
    editor.hover_swap(cell("Dispensary", slot, b.id));
    assert_eq!(editor.drop_swap().await.unwrap(), SwapOutcome::Swapped);

    let swapped = service.rota(rota_id).await.unwrap();
    assert_eq!(swapped.assignments[0].pharmacist_id(), b.id);
    assert_eq!(swapped.assignments[1].pharmacist_id(), a.id);
    assert_eq!(
        editor.index().ward_at(monday(), "Ward 1", &slot).map(|w| w.pharmacist_id()),
        Some(b.id)
    );

    editor.arm_swap(cell("Ward 1", slot, b.id)).unwrap();
    editor.hover_swap(cell("Dispensary", slot, a.id));
    assert_eq!(editor.drop_swap().await.unwrap(), SwapOutcome::Swapped);

    assert_eq!(service.rota(rota_id).await.unwrap().assignments, rota.assignments);
}

#[test_log::test(tokio::test)]
async fn test_swap_rolls_back_when_second_write_fails() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let slot = range("11:00", "13:00");
    let rota = draft(
        monday(),
        vec![
            ward("Ward 4", a, monday(), slot),
            ward("Ward 5", b, monday(), slot),
        ],
    );
    let original = rota.assignments.clone();
    let mut index = AssignmentIndex::build(week(), RotaStatus::Draft, &[rota], None);

    let mut remote = MockRotaRemote::new();
    remote
        .expect_update_rota_assignment()
        .withf(|_, slot, _, _| *slot == AssignmentSlot::At(0))
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    remote
        .expect_update_rota_assignment()
        .withf(|_, slot, _, _| *slot == AssignmentSlot::At(1))
        .times(1)
        .returning(|_, _, _, _| Err(RotaError::Database(eyre::eyre!("connection reset"))));

    let mut swap = SwapProtocol::new();
    swap.arm(cell("Ward 4", slot, a)).unwrap();
    swap.hover(cell("Ward 5", slot, b));
    let outcome = swap.drop_on(&mut index, &remote).await;

    assert!(matches!(
        outcome,
        SwapOutcome::RolledBack {
            partially_applied: true,
            ..
        }
    ));
    assert_eq!(index.rota_for(monday()).unwrap().assignments, original);
    assert_eq!(swap.state(), &SwapState::Idle);
}

#[tokio::test]
async fn test_swap_aborts_when_record_is_missing() {
    let slot = range("09:00", "11:00");
    let mut index = AssignmentIndex::build(week(), RotaStatus::Draft, &[draft(monday(), Vec::new())], None);
    let remote = MockRotaRemote::new();

    let mut swap = SwapProtocol::new();
    swap.arm(cell("Ward 1", slot, Uuid::new_v4())).unwrap();
    swap.hover(cell("Ward 2", slot, Uuid::new_v4()));

    assert!(matches!(
        swap.drop_on(&mut index, &remote).await,
        SwapOutcome::Aborted { .. }
    ));
}

#[tokio::test]
async fn test_swap_between_occupants_of_one_cell_is_ignored() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let slot = range("09:00", "11:00");
    let rota = draft(
        monday(),
        vec![dispensary(a, monday(), slot, false), dispensary(b, monday(), slot, false)],
    );
    let original = rota.assignments.clone();
    let mut index = AssignmentIndex::build(week(), RotaStatus::Draft, &[rota], None);
    let remote = MockRotaRemote::new();

    let mut swap = SwapProtocol::new();
    swap.arm(cell("Dispensary", slot, a)).unwrap();
    swap.hover(cell("Dispensary", slot, b));
    assert!(matches!(swap.state(), SwapState::Armed { .. }));

    assert_eq!(swap.drop_on(&mut index, &remote).await, SwapOutcome::Ignored);
    assert_eq!(index.rota_for(monday()).unwrap().assignments, original);
    assert_eq!(swap.state(), &SwapState::Idle);
}

#[test]
fn test_free_text_is_partitioned_by_key_date() {
    let text = BTreeMap::from([
        ("dispensary-2024-06-03-09:00-11:00".to_string(), "Agency cover".to_string()),
        ("Unavailable Pharmacists-2024-06-04".to_string(), "Training".to_string()),
        ("Ward 7-East-2024-06-04-13:00-15:00".to_string(), "Bank".to_string()),
        ("nonsense".to_string(), "?".to_string()),
    ]);

    let partition = partition_free_cell_text(&text);

    assert_eq!(partition.by_date.len(), 2);
    assert_eq!(partition.by_date[&monday()].len(), 1);
    assert_eq!(partition.by_date[&day(1)].len(), 2);
    assert_eq!(partition.unparseable, vec!["nonsense".to_string()]);
}

#[test_log::test(tokio::test)]
async fn test_publish_attaches_text_to_its_date_only() {
    let rotas: Vec<_> = (0..5).map(|offset| draft(day(offset), Vec::new())).collect();
    let service = Arc::new(InMemoryRotaService::new().with_rotas(rotas));
    let mut session = EditSession::new(week());
    session.set_free_cell_text("dispensary-2024-06-03-09:00-11:00", "Agency cover");
    let mut editor = RotaEditor::load(service.clone(), session, GenerationGuard::new())
        .await
        .unwrap();

    let actor = Actor {
        name: "Lead Pharmacist".to_string(),
    };
    let outcome = editor.publish(&actor).await.unwrap();

    assert_eq!(outcome.published_rota_ids.len(), 5);
    assert!(outcome.discarded_keys.is_empty());
    for rota in service.all_rotas().await {
        if rota.date == monday() {
            assert_eq!(
                rota.free_cell_text.get("dispensary-2024-06-03-09:00-11:00"),
                Some(&"Agency cover".to_string())
            );
        } else {
            assert!(rota.free_cell_text.is_empty(), "unexpected text on {}", rota.date);
        }
    }
    let published = service.list_rotas(RotaStatus::Published).await.unwrap();
    assert!(published.iter().all(|rota| rota.published_by.as_deref() == Some("Lead Pharmacist")));
}

#[tokio::test]
async fn test_publish_calls_remote_once_with_first_rota() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let mut remote = MockRotaRemote::new();
    remote
        .expect_save_free_cell_text()
        .times(2)
        .returning(|_, _| Ok(()));
    remote
        .expect_publish_rota()
        .times(1)
        .returning(move |rota_id, user_name, week_start| {
            assert_eq!(rota_id, first);
            assert_eq!(user_name, "Lead");
            assert_eq!(week_start, monday());
            Ok(vec![Uuid::new_v4(), Uuid::new_v4()])
        });

    let text = BTreeMap::from([("Management Time-2024-06-09".to_string(), "Audit".to_string())]);
    let outcome = publish(
        &remote,
        &[(monday(), first), (day(1), second)],
        &text,
        &Actor {
            name: "Lead".to_string(),
        },
        week(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.published_rota_ids.len(), 2);
    assert_eq!(outcome.discarded_keys, vec!["Management Time-2024-06-09".to_string()]);
}

#[tokio::test]
async fn test_publishing_empty_week_is_a_no_op() {
    let remote = MockRotaRemote::new();

    let outcome = publish(
        &remote,
        &[],
        &BTreeMap::new(),
        &Actor {
            name: "Lead".to_string(),
        },
        week(),
    )
    .await
    .unwrap();

    assert!(outcome.published_rota_ids.is_empty());
}

#[tokio::test]
async fn test_generation_rejected_while_in_progress() {
    let p = pharmacist("Priya");
    let mut session = EditSession::new(week());
    session.selected_pharmacists = vec![p.id];
    let guard = GenerationGuard::new();
    let remote = MockRotaRemote::new();

    let ticket = guard.try_begin().unwrap();
    let result = generate(&guard, &remote, &session, &[p], false).await;

    assert!(matches!(result, Err(RotaError::Conflict(_))));
    drop(ticket);
    assert!(!guard.is_busy());
}

#[test]
fn test_generation_request_carries_resolved_rules() {
    let p = with_rule(pharmacist("Priya"), Weekday::Mon, "09:00", "11:00");
    let p = with_rule(p, Weekday::Fri, "15:00", "17:00");
    let mut session = EditSession::new(week());
    assert!(matches!(build_request(&session, &[p.clone()], false), Err(RotaError::Validation(_))));

    session.selected_pharmacists = vec![p.id];
    session.overrides_mut(p.id).set_ignored_at(&p, 1, true).unwrap();
    let request = build_request(&session, &[p.clone()], true).unwrap();

    assert_eq!(request.start_date, monday());
    assert_eq!(request.unavailable_rules_by_pharmacist[&p.id], vec![p.not_available_rules[0].clone()]);
    assert_eq!(
        request.selected_weekdays,
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
    );
    assert!(request.regenerate);
}

#[test_log::test(tokio::test)]
async fn test_generate_seeds_unavailability_and_weekdays() {
    let p = with_rule(pharmacist("Priya"), Weekday::Mon, "10:00", "12:00");
    let service = Arc::new(InMemoryRotaService::new().with_pharmacists(vec![p.clone()]));
    let mut session = EditSession::new(week());
    session.selected_pharmacists = vec![p.id];
    session.toggle_weekday(Weekday::Wed);
    let mut editor = RotaEditor::load(service.clone(), session, GenerationGuard::new())
        .await
        .unwrap();

    let ids = editor.generate(false).await.unwrap();

    assert_eq!(ids.len(), 4);
    assert!(editor.index().rota_for(day(2)).is_none());
    assert!(editor.is_day_active(monday()));
    let monday_rota = editor.index().rota_for(monday()).unwrap();
    let unavailable: Vec<_> = monday_rota
        .assignments
        .iter()
        .filter(|a| a.assignment_type() == AssignmentType::Unavailable)
        .map(|a| a.range())
        .collect();
    assert_eq!(unavailable, vec![range("09:00", "11:00"), range("11:00", "13:00")]);

    let again = editor.generate(false).await;
    assert!(matches!(again, Err(RotaError::Conflict(_))));
    assert_eq!(editor.generate(true).await.unwrap().len(), 4);
}

#[test]
fn test_corrupt_cached_state_is_discarded() {
    let session = EditSession::new(week());
    let raw = session.persist().unwrap();

    assert_eq!(EditSession::restore(Some(&raw)).map(|s| s.week), Some(week()));
    assert!(EditSession::restore(Some("{\"week\":")).is_none());
    assert!(EditSession::restore(None).is_none());
    assert!(Actor::restore(Some("not json")).is_none());
    assert!(Actor::restore(Some("{\"name\":\"  \"}")).is_none());
    assert_eq!(
        Actor::restore(Some("{\"name\":\"Lead\"}")),
        Some(Actor {
            name: "Lead".to_string()
        })
    );
}
