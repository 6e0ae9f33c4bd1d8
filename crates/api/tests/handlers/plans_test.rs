use axum::http::StatusCode;
use mockall::predicate;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use serviceplan_core::{
    errors::PlanError,
    models::{actor::Role, plan::PositionChange},
};
use uuid::Uuid;

use crate::test_utils::{TestContext, as_actor, service_items};

#[tokio::test]
async fn test_list_items_builds_run_sheet() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Musician);
    // Stored with a gap and out of order
    let items = service_items(&[4, 0, 2]);

    ctx.store
        .expect_get_plan()
        .with(predicate::eq(ctx.organization_id), predicate::eq(plan_id))
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .with(predicate::eq(plan_id))
        .returning(move |_| Ok(items.clone()));

    let server = ctx.server();
    let response = as_actor(server.get(&format!("/api/plans/{}/items", plan_id)), &actor).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total_duration_minutes"], 15);
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Item 0", "Item 2", "Item 4"]);
    assert_eq!(body["items"][2]["sequence_position"], 2);
    assert_eq!(body["items"][0]["starts_at"], "10:00");
    assert_eq!(body["items"][2]["starts_at"], "10:10");
    assert_eq!(body["run_sheet_start"], "10:00");
    assert_eq!(body["run_sheet_clock"], "utc");
}

#[tokio::test]
async fn test_list_items_from_local_start() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Musician);
    let items = service_items(&[0, 1, 2]);

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));

    let server = ctx.server();
    let response = as_actor(
        server.get(&format!("/api/plans/{}/items?start=09:30", plan_id)),
        &actor,
    )
    .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["run_sheet_start"], "09:30");
    assert_eq!(body["run_sheet_clock"], "local");
    assert_eq!(body["items"][0]["starts_at"], "09:30");
    assert_eq!(body["items"][2]["starts_at"], "09:40");
    // The stored date is untouched
    assert_eq!(body["service_date"], "2026-04-05T10:00:00Z");
}

#[tokio::test]
async fn test_list_items_rejects_bad_start() {
    let ctx = TestContext::new();
    let actor = ctx.actor(Role::Musician);

    let server = ctx.server();
    let response = as_actor(
        server.get(&format!("/api/plans/{}/items?start=25:99", Uuid::new_v4())),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("25:99"));
}

#[tokio::test]
async fn test_move_item_writes_only_changed_positions() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Planner);
    let items = service_items(&[0, 1, 2, 3]);
    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    let expected = vec![
        PositionChange { id: ids[2], from: 2, to: 1 },
        PositionChange { id: ids[3], from: 3, to: 2 },
        PositionChange { id: ids[1], from: 1, to: 3 },
    ];
    let written = expected.clone();

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store
        .expect_update_positions()
        .withf(move |id, changes| *id == plan_id && changes.iter().eq(written.iter()))
        .times(1)
        .returning(|_, _| Ok(()));

    let server = ctx.server();
    let response = as_actor(
        server
            .post(&format!("/api/plans/{}/items/move", plan_id))
            .json(&json!({ "from_index": 1, "to_index": 3 })),
        &actor,
    )
    .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["changes"], serde_json::to_value(&expected).unwrap());
    let order: Vec<String> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect();
    let expected_order: Vec<String> = [ids[0], ids[2], ids[3], ids[1]]
        .iter()
        .map(Uuid::to_string)
        .collect();
    assert_eq!(order, expected_order);
}

#[tokio::test]
async fn test_move_item_to_same_index_writes_nothing() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Admin);
    let items = service_items(&[0, 1, 2]);

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store.expect_update_positions().times(0);

    let server = ctx.server();
    let response = as_actor(
        server
            .post(&format!("/api/plans/{}/items/move", plan_id))
            .json(&json!({ "from_index": 1, "to_index": 1 })),
        &actor,
    )
    .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["changes"], json!([]));
}

#[tokio::test]
async fn test_move_item_out_of_range() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Planner);
    let items = service_items(&[0, 1]);

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store.expect_update_positions().times(0);

    let server = ctx.server();
    let response = as_actor(
        server
            .post(&format!("/api/plans/{}/items/move", plan_id))
            .json(&json!({ "from_index": 0, "to_index": 2 })),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_musicians_cannot_reorder() {
    let mut ctx = TestContext::new();
    let actor = ctx.actor(Role::Musician);

    ctx.store.expect_get_plan().times(0);
    ctx.store.expect_update_positions().times(0);

    let server = ctx.server();
    let response = as_actor(
        server
            .post(&format!("/api/plans/{}/items/move", Uuid::new_v4()))
            .json(&json!({ "from_index": 0, "to_index": 1 })),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_remove_item_compacts_positions() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Admin);
    let items = service_items(&[0, 1, 2]);
    let removed = items[0].id;
    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    let expected = vec![
        PositionChange { id: ids[1], from: 1, to: 0 },
        PositionChange { id: ids[2], from: 2, to: 1 },
    ];
    let compaction = expected.clone();

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store
        .expect_delete_service_item()
        .withf(move |id, item_id, changes| {
            *id == plan_id && *item_id == removed && changes.iter().eq(compaction.iter())
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let server = ctx.server();
    let response = as_actor(
        server.delete(&format!("/api/plans/{}/items/{}", plan_id, removed)),
        &actor,
    )
    .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["removed_id"], removed.to_string());
    assert_eq!(body["changes"], serde_json::to_value(&expected).unwrap());
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_unknown_item() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Planner);
    let items = service_items(&[0, 1]);

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store.expect_delete_service_item().times(0);

    let server = ctx.server();
    let response = as_actor(
        server.delete(&format!("/api/plans/{}/items/{}", plan_id, Uuid::new_v4())),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plan_from_another_organization_is_not_found() {
    let mut ctx = TestContext::new();
    let actor = ctx.actor(Role::Admin);

    ctx.store.expect_get_plan().returning(|_, _| Ok(None));
    ctx.store.expect_list_service_items().times(0);

    let server = ctx.server();
    let response = as_actor(
        server.get(&format!("/api/plans/{}/items", Uuid::new_v4())),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_removed_concurrently_is_not_found() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Planner);
    let items = service_items(&[0, 1]);
    let removed = items[1].id;

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store
        .expect_delete_service_item()
        .times(1)
        .returning(|_, item_id, _| {
            Err(eyre::Report::new(PlanError::NotFound(format!(
                "Service item {} not found",
                item_id
            ))))
        });

    let server = ctx.server();
    let response = as_actor(
        server.delete(&format!("/api/plans/{}/items/{}", plan_id, removed)),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_reorder_is_a_conflict() {
    let mut ctx = TestContext::new();
    let plan = ctx.plan();
    let plan_id = plan.id;
    let actor = ctx.actor(Role::Admin);
    let items = service_items(&[0, 1, 2]);

    ctx.store
        .expect_get_plan()
        .returning(move |_, _| Ok(Some(plan.clone())));
    ctx.store
        .expect_list_service_items()
        .returning(move |_| Ok(items.clone()));
    ctx.store
        .expect_update_positions()
        .times(1)
        .returning(|_, _| {
            Err(eyre::Report::new(PlanError::Conflict(
                "Service plan was changed concurrently".to_string(),
            )))
        });

    let server = ctx.server();
    let response = as_actor(
        server
            .post(&format!("/api/plans/{}/items/move", plan_id))
            .json(&json!({ "from_index": 0, "to_index": 2 })),
        &actor,
    )
    .await;

    response.assert_status(StatusCode::CONFLICT);
    assert!(
        response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .starts_with("Conflict:")
    );
}
