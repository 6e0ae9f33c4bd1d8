use std::collections::HashMap;

use async_trait::async_trait;
use eyre::Result;
use serviceplan_core::models::{
    assignment::Assignment,
    plan::{Plan, PositionChange, ServiceItemEntry},
    task::{EventDetails, Task},
};
use uuid::Uuid;

use crate::{DbPool, repositories};

/// Read and write access to plans, tasks and their assignments. Every
/// lookup that starts from a user supplied id is scoped to the caller's
/// organization.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_task(&self, organization_id: Uuid, task_id: Uuid) -> Result<Option<Task>>;

    /// Assignments in creation order.
    async fn list_assignments(&self, task_id: Uuid) -> Result<Vec<Assignment>>;

    /// Resolves event ids to their details. Unknown ids are left out of
    /// the map.
    async fn get_events(
        &self,
        organization_id: Uuid,
        event_ids: &[String],
    ) -> Result<HashMap<String, EventDetails>>;

    async fn get_plan(&self, organization_id: Uuid, plan_id: Uuid) -> Result<Option<Plan>>;

    /// Service items ordered by sequence position.
    async fn list_service_items(&self, plan_id: Uuid) -> Result<Vec<ServiceItemEntry>>;

    /// Applies `changes` only if every item still sits at its `from`
    /// position. A stale change fails with `PlanError::Conflict` inside the
    /// returned report.
    async fn update_positions(&self, plan_id: Uuid, changes: &[PositionChange]) -> Result<()>;

    /// Fails with `PlanError::NotFound` inside the returned report when the
    /// item is already gone, and with `PlanError::Conflict` when the
    /// compaction no longer matches the stored positions.
    async fn delete_service_item(
        &self,
        plan_id: Uuid,
        item_id: Uuid,
        compaction: &[PositionChange],
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct PgPlanStore {
    pool: DbPool,
}

impl PgPlanStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn get_task(&self, organization_id: Uuid, task_id: Uuid) -> Result<Option<Task>> {
        repositories::task::get_task(&self.pool, organization_id, task_id)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list_assignments(&self, task_id: Uuid) -> Result<Vec<Assignment>> {
        let rows = repositories::task::list_assignments(&self.pool, task_id).await?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }

    async fn get_events(
        &self,
        organization_id: Uuid,
        event_ids: &[String],
    ) -> Result<HashMap<String, EventDetails>> {
        let plan_ids: Vec<Uuid> = event_ids
            .iter()
            .filter_map(|id| match Uuid::parse_str(id) {
                Ok(uuid) => Some(uuid),
                Err(_) => {
                    tracing::debug!("Event id {} is not a plan id, leaving unresolved", id);
                    None
                }
            })
            .collect();

        let plans = repositories::plan::get_plans_by_ids(&self.pool, organization_id, &plan_ids).await?;

        Ok(plans
            .into_iter()
            .map(EventDetails::from)
            .map(|details| (details.id.clone(), details))
            .collect())
    }

    async fn get_plan(&self, organization_id: Uuid, plan_id: Uuid) -> Result<Option<Plan>> {
        let plan = repositories::plan::get_plan(&self.pool, organization_id, plan_id).await?;
        Ok(plan.map(Plan::from))
    }

    async fn list_service_items(&self, plan_id: Uuid) -> Result<Vec<ServiceItemEntry>> {
        repositories::service_item::list_service_items(&self.pool, plan_id)
            .await?
            .into_iter()
            .map(ServiceItemEntry::try_from)
            .collect()
    }

    async fn update_positions(&self, plan_id: Uuid, changes: &[PositionChange]) -> Result<()> {
        repositories::service_item::update_positions(&self.pool, plan_id, changes).await
    }

    async fn delete_service_item(
        &self,
        plan_id: Uuid,
        item_id: Uuid,
        compaction: &[PositionChange],
    ) -> Result<()> {
        repositories::service_item::delete_service_item(&self.pool, plan_id, item_id, compaction)
            .await
    }
}
