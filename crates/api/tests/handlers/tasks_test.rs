use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use mockall::predicate;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use serviceplan_core::models::{
    actor::Role,
    assignment::AssignmentStatus,
    task::{EventDetails, TaskKind},
};
use uuid::Uuid;

use crate::test_utils::{TestContext, as_actor, assignment};

fn rehearsal_config() -> Value {
    json!({
        "days": ["Tuesday", "Monday"],
        "time_start": "18:00",
        "time_end": "19:00",
        "interval_minutes": 30
    })
}

#[tokio::test]
async fn test_task_slots_returns_grid_rows() {
    let mut ctx = TestContext::new();
    let task = ctx.task(TaskKind::RehearsalPoll, rehearsal_config());
    let actor = ctx.actor(Role::Musician);
    let task_id = task.id;

    ctx.store
        .expect_get_task()
        .with(predicate::eq(ctx.organization_id), predicate::eq(task_id))
        .times(1)
        .returning(move |_, _| Ok(Some(task.clone())));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/slots", task_id)), &actor).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["days"], json!(["Monday", "Tuesday"]));
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    assert_eq!(body["rows"][0]["time"], "18:00");
    assert_eq!(body["rows"][1]["slots"][0]["id"], "Monday-18:30");
    assert_eq!(body["rows"][1]["slots"][1]["id"], "Tuesday-18:30");
}

#[tokio::test]
async fn test_task_slots_requires_a_rehearsal_poll() {
    let mut ctx = TestContext::new();
    let task = ctx.task(TaskKind::Acknowledgement, json!({}));
    let actor = ctx.actor(Role::Musician);
    let task_id = task.id;

    ctx.store
        .expect_get_task()
        .returning(move |_, _| Ok(Some(task.clone())));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/slots", task_id)), &actor).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rehearsal_report() {
    let mut ctx = TestContext::new();
    let task = ctx.task(TaskKind::RehearsalPoll, rehearsal_config());
    let actor = ctx.actor(Role::Planner);
    let task_id = task.id;
    let assignments = vec![
        assignment(
            task_id,
            "Ada",
            AssignmentStatus::Completed,
            Some(json!({ "selected_slots": ["Monday-18:00", "Tuesday-18:30"] })),
        ),
        assignment(
            task_id,
            "Grace",
            AssignmentStatus::Completed,
            Some(json!({ "selected_slots": [{ "day": "Monday", "time": "18:00" }] })),
        ),
        assignment(task_id, "Linus", AssignmentStatus::Pending, None),
    ];

    ctx.store
        .expect_get_task()
        .returning(move |_, _| Ok(Some(task.clone())));
    ctx.store
        .expect_list_assignments()
        .with(predicate::eq(task_id))
        .times(1)
        .returning(move |_| Ok(assignments.clone()));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/report", task_id)), &actor).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "rehearsal_poll");
    assert_eq!(body["task_id"], task_id.to_string());
    assert_eq!(body["max_count"], 2);
    assert_eq!(body["total_responded"], 2);
    assert_eq!(body["not_responded"], json!(["Linus"]));
    assert_eq!(body["slots"].as_array().unwrap().len(), 4);
    assert_eq!(body["slots"][0]["slot"]["id"], "Monday-18:00");
    assert_eq!(body["slots"][0]["roster"], json!(["Ada", "Grace"]));
}

#[tokio::test]
async fn test_availability_report_resolves_events() {
    let mut ctx = TestContext::new();
    let plan_id = Uuid::new_v4().to_string();
    let task = ctx.task(
        TaskKind::Availability,
        json!({ "event_ids": [plan_id, "retired-event"] }),
    );
    let actor = ctx.actor(Role::Musician);
    let task_id = task.id;
    let assignments = vec![assignment(
        task_id,
        "Ada",
        AssignmentStatus::Completed,
        Some(json!({ "availabilities": { plan_id.clone(): "YES", "retired-event": "MAYBE" } })),
    )];
    let events = HashMap::from([(
        plan_id.clone(),
        EventDetails {
            id: plan_id.clone(),
            title: "Good Friday".to_string(),
            starts_at: Some(Utc.with_ymd_and_hms(2026, 4, 3, 19, 0, 0).unwrap()),
        },
    )]);

    ctx.store
        .expect_get_task()
        .returning(move |_, _| Ok(Some(task.clone())));
    ctx.store
        .expect_list_assignments()
        .returning(move |_| Ok(assignments.clone()));
    ctx.store
        .expect_get_events()
        .withf(|_, ids| ids.len() == 2)
        .times(1)
        .returning(move |_, _| Ok(events.clone()));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/report", task_id)), &actor).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "availability");
    assert_eq!(body["events"][0]["label"], "Good Friday");
    assert_eq!(body["events"][0]["available"], json!(["Ada"]));
    assert_eq!(body["events"][1]["label"], "retired-event");
    assert_eq!(body["events"][1]["resolved"], false);
    assert_eq!(body["events"][1]["maybe"], json!(["Ada"]));
}

#[tokio::test]
async fn test_acknowledgement_report() {
    let mut ctx = TestContext::new();
    let task = ctx.task(TaskKind::Acknowledgement, json!({ "message": "New dress code" }));
    let actor = ctx.actor(Role::Admin);
    let task_id = task.id;
    let assignments = vec![
        assignment(
            task_id,
            "Ada",
            AssignmentStatus::Completed,
            Some(json!({ "acknowledged_at": "2026-03-01T12:00:00Z" })),
        ),
        assignment(task_id, "Grace", AssignmentStatus::Pending, None),
    ];

    ctx.store
        .expect_get_task()
        .returning(move |_, _| Ok(Some(task.clone())));
    ctx.store
        .expect_list_assignments()
        .returning(move |_| Ok(assignments.clone()));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/report", task_id)), &actor).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "acknowledgement");
    assert_eq!(body["acknowledged"][0]["display_name"], "Ada");
    assert_eq!(body["pending"], json!(["Grace"]));
}

#[tokio::test]
async fn test_report_with_invalid_config() {
    let mut ctx = TestContext::new();
    let task = ctx.task(
        TaskKind::RehearsalPoll,
        json!({
            "days": ["Monday"],
            "time_start": "19:00",
            "time_end": "18:00",
            "interval_minutes": 30
        }),
    );
    let actor = ctx.actor(Role::Planner);
    let task_id = task.id;

    ctx.store
        .expect_get_task()
        .returning(move |_, _| Ok(Some(task.clone())));
    ctx.store
        .expect_list_assignments()
        .returning(|_| Ok(Vec::new()));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/tasks/{}/report", task_id)), &actor).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_task() {
    let mut ctx = TestContext::new();
    let actor = ctx.actor(Role::Admin);

    ctx.store.expect_get_task().returning(|_, _| Ok(None));

    let server = ctx.server();
    let response = as_actor(
        server.get(&format!("/api/tasks/{}/report", Uuid::new_v4())),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_report_requires_identity() {
    let mut ctx = TestContext::new();
    ctx.store.expect_get_task().times(0);

    let server = ctx.server();
    let response = server
        .get(&format!("/api/tasks/{}/report", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_storage_failure_is_reported_generically() {
    let mut ctx = TestContext::new();
    let actor = ctx.actor(Role::Admin);

    ctx.store
        .expect_get_task()
        .returning(|_, _| Err(eyre::eyre!("connection refused")));

    let server = ctx.server();
    let response = as_actor(
        server.get(&format!("/api/tasks/{}/slots", Uuid::new_v4())),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), json!({ "error": "Database error" }));
}
