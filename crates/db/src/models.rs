use chrono::{DateTime, Utc};
use eyre::{Report, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serviceplan_core::models::{
    assignment::{Assignment, AssignmentStatus, Participant},
    plan::{OrderedItem, Plan, ServiceItem, ServiceItemEntry, ServiceItemKind},
    task::{EventDetails, Task, TaskKind},
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPlan {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub service_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServiceItem {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    pub kind: String,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTask {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub title: String,
    pub kind: String,
    pub config: Value,
    pub created_at: DateTime<Utc>,
}

/// Assignment row joined with the participant's profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAssignment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub participant_id: Uuid,
    pub display_name: String,
    pub status: String,
    pub response_data: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbPlan> for Plan {
    fn from(row: DbPlan) -> Self {
        Self {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            service_date: row.service_date,
        }
    }
}

impl From<DbPlan> for EventDetails {
    fn from(row: DbPlan) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            starts_at: Some(row.service_date),
        }
    }
}

impl TryFrom<DbServiceItem> for ServiceItemEntry {
    type Error = Report;

    fn try_from(row: DbServiceItem) -> Result<Self, Self::Error> {
        let sequence_position = usize::try_from(row.sequence_number)
            .wrap_err_with(|| format!("Negative sequence number on service item {}", row.id))?;
        let kind = row
            .kind
            .parse::<ServiceItemKind>()
            .unwrap_or(ServiceItemKind::Other);

        Ok(OrderedItem::new(
            row.id,
            sequence_position,
            ServiceItem {
                title: row.title,
                kind,
                duration_minutes: row.duration_minutes.and_then(|m| u32::try_from(m).ok()),
                notes: row.notes,
            },
        ))
    }
}

impl TryFrom<DbTask> for Task {
    type Error = Report;

    fn try_from(row: DbTask) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<TaskKind>()
            .map_err(|e| eyre!("Task {} has an unreadable kind: {}", row.id, e))?;

        Ok(Self {
            id: row.id,
            organization_id: row.organization_id,
            plan_id: row.plan_id,
            title: row.title,
            kind,
            config: row.config,
            created_at: row.created_at,
        })
    }
}

/// Unknown statuses are treated as pending so they never contribute to a
/// report. A JSONB `null` payload becomes `None`.
impl From<DbAssignment> for Assignment {
    fn from(row: DbAssignment) -> Self {
        let status = row.status.parse::<AssignmentStatus>().unwrap_or_else(|e| {
            tracing::warn!("Assignment {}: {}, treating as pending", row.id, e);
            AssignmentStatus::Pending
        });

        Self {
            id: row.id,
            task_id: row.task_id,
            participant: Participant {
                id: row.participant_id,
                display_name: row.display_name,
            },
            status,
            response_data: row.response_data.filter(|raw| !raw.is_null()),
        }
    }
}
