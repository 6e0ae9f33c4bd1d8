use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serviceplan_core::{
    aggregate::{
        AcknowledgementSummary, AvailabilityReport, RehearsalSummary, aggregate_acknowledgements,
        aggregate_availability, aggregate_rehearsal,
    },
    errors::PlanError,
    models::{
        actor::Actor,
        slot::{Day, SlotConfig},
        task::{RehearsalPollConfig, Task, TaskConfig, TaskKind},
    },
    slots::{SlotGrid, SlotRow, generate_slots},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentActor, error_handling::AppError},
};

#[derive(Debug, Serialize)]
pub struct TaskSlotsResponse {
    pub task_id: Uuid,
    pub title: String,
    pub days: Vec<Day>,
    pub rows: Vec<SlotRow>,
}

/// Report body, tagged by the kind of task it summarizes.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskReport {
    RehearsalPoll(RehearsalSummary),
    Availability(AvailabilityReport),
    Acknowledgement(AcknowledgementSummary),
}

#[derive(Debug, Serialize)]
pub struct TaskReportResponse {
    pub task_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub report: TaskReport,
}

#[axum::debug_handler]
pub async fn task_slots(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskSlotsResponse>, AppError> {
    let task = load_task(&state, &actor, id).await?;

    let TaskConfig::RehearsalPoll(config) = task.parsed_config()? else {
        return Err(AppError(PlanError::Validation(format!(
            "Task {} is a {} task, not a rehearsal poll",
            task.id, task.kind
        ))));
    };
    let grid = slot_grid(&config)?;

    Ok(Json(TaskSlotsResponse {
        task_id: task.id,
        title: task.title,
        days: grid.days().to_vec(),
        rows: grid.rows(),
    }))
}

#[axum::debug_handler]
pub async fn task_report(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskReportResponse>, AppError> {
    let task = load_task(&state, &actor, id).await?;
    let config = task.parsed_config()?;
    let assignments = state.store.list_assignments(task.id).await?;

    let report = match config {
        TaskConfig::RehearsalPoll(config) => {
            let grid = slot_grid(&config)?;
            TaskReport::RehearsalPoll(aggregate_rehearsal(&grid, &assignments))
        }
        TaskConfig::Availability(config) => {
            let events = state
                .store
                .get_events(actor.organization_id, &config.event_ids)
                .await?;
            TaskReport::Availability(aggregate_availability(
                &config.event_ids,
                &events,
                &assignments,
            ))
        }
        TaskConfig::Acknowledgement(_) => {
            TaskReport::Acknowledgement(aggregate_acknowledgements(&assignments))
        }
    };

    tracing::debug!(
        "Built {} report for task {} from {} assignments",
        report.kind(),
        task.id,
        assignments.len()
    );

    Ok(Json(TaskReportResponse {
        task_id: task.id,
        title: task.title,
        report,
    }))
}

async fn load_task(state: &ApiState, actor: &Actor, id: Uuid) -> Result<Task, AppError> {
    let task = state
        .store
        .get_task(actor.organization_id, id)
        .await?
        .ok_or_else(|| PlanError::NotFound(format!("Task with ID {} not found", id)))?;

    Ok(task)
}

fn slot_grid(config: &RehearsalPollConfig) -> Result<SlotGrid, AppError> {
    let config = SlotConfig::try_from(config)?;
    Ok(generate_slots(&config)?)
}

impl TaskReport {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskReport::RehearsalPoll(_) => TaskKind::RehearsalPoll,
            TaskReport::Availability(_) => TaskKind::Availability,
            TaskReport::Acknowledgement(_) => TaskKind::Acknowledgement,
        }
    }
}
