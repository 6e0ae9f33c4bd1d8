use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serviceplan_core::{
    errors::PlanError,
    models::{
        actor::Actor,
        plan::{Plan, PositionChange, ServiceItemEntry},
        slot::{hhmm, parse_time_of_day},
    },
    resequence::{normalize_positions, position_changes, resequence, resequence_after_removal},
    run_sheet::{RunSheetEntry, run_sheet, total_duration},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::{CurrentActor, require_editor},
        error_handling::AppError,
    },
};

/// Clock the run sheet times are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSheetClock {
    /// Derived from `service_date`, which is stored in UTC.
    Utc,
    /// Supplied by the caller as the local start of the service.
    Local,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunSheetQuery {
    /// Local start of the service as `HH:MM`.
    pub start: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanItemsResponse {
    pub plan_id: Uuid,
    pub title: String,
    pub service_date: DateTime<Utc>,
    #[serde(with = "hhmm")]
    pub run_sheet_start: NaiveTime,
    pub run_sheet_clock: RunSheetClock,
    pub total_duration_minutes: u32,
    pub items: Vec<RunSheetEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveItemRequest {
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Serialize)]
pub struct MoveItemResponse {
    pub plan_id: Uuid,
    pub changes: Vec<PositionChange>,
    pub items: Vec<ServiceItemEntry>,
}

#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    pub plan_id: Uuid,
    pub removed_id: Uuid,
    pub changes: Vec<PositionChange>,
    pub items: Vec<ServiceItemEntry>,
}

#[axum::debug_handler]
pub async fn list_items(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(plan_id): Path<Uuid>,
    Query(query): Query<RunSheetQuery>,
) -> Result<Json<PlanItemsResponse>, AppError> {
    let (start, clock) = match query.start.as_deref() {
        Some(label) => {
            let start = parse_time_of_day(label).ok_or_else(|| {
                PlanError::Validation(format!("Invalid run sheet start time: {:?}", label))
            })?;
            (Some(start), RunSheetClock::Local)
        }
        None => (None, RunSheetClock::Utc),
    };

    let plan = load_plan(&state, &actor, plan_id).await?;
    let items = normalize_positions(state.store.list_service_items(plan.id).await?);
    let start = start.unwrap_or_else(|| plan.service_date.time());

    Ok(Json(PlanItemsResponse {
        plan_id: plan.id,
        title: plan.title,
        service_date: plan.service_date,
        run_sheet_start: start,
        run_sheet_clock: clock,
        total_duration_minutes: total_duration(&items),
        items: run_sheet(&items, start),
    }))
}

#[axum::debug_handler]
pub async fn move_item(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<MoveItemRequest>,
) -> Result<Json<MoveItemResponse>, AppError> {
    require_editor(&actor)?;
    let plan = load_plan(&state, &actor, plan_id).await?;

    let stored = state.store.list_service_items(plan.id).await?;
    let items = resequence(
        normalize_positions(stored.clone()),
        payload.from_index,
        payload.to_index,
    )?;

    // Compared against the stored rows so gaps left by earlier edits are
    // written back as well.
    let changes = position_changes(&stored, &items);
    if !changes.is_empty() {
        state.store.update_positions(plan.id, &changes).await?;
    }

    tracing::info!(
        "Moved item {} -> {} in plan {} ({} positions changed)",
        payload.from_index,
        payload.to_index,
        plan.id,
        changes.len()
    );

    Ok(Json(MoveItemResponse {
        plan_id: plan.id,
        changes,
        items,
    }))
}

#[axum::debug_handler]
pub async fn remove_item(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path((plan_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RemoveItemResponse>, AppError> {
    require_editor(&actor)?;
    let plan = load_plan(&state, &actor, plan_id).await?;

    let stored = state.store.list_service_items(plan.id).await?;
    let items = resequence_after_removal(normalize_positions(stored.clone()), item_id)?;
    let changes = position_changes(&stored, &items);

    state
        .store
        .delete_service_item(plan.id, item_id, &changes)
        .await?;

    tracing::info!(
        "Removed item {} from plan {} ({} positions changed)",
        item_id,
        plan.id,
        changes.len()
    );

    Ok(Json(RemoveItemResponse {
        plan_id: plan.id,
        removed_id: item_id,
        changes,
        items,
    }))
}

async fn load_plan(state: &ApiState, actor: &Actor, plan_id: Uuid) -> Result<Plan, AppError> {
    let plan = state
        .store
        .get_plan(actor.organization_id, plan_id)
        .await?
        .ok_or_else(|| PlanError::NotFound(format!("Plan with ID {} not found", plan_id)))?;

    Ok(plan)
}
