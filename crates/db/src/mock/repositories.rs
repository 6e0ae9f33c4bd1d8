use std::collections::HashMap;

use async_trait::async_trait;
use mockall::mock;
use serviceplan_core::models::{
    assignment::Assignment,
    plan::{Plan, PositionChange, ServiceItemEntry},
    task::{EventDetails, Task},
};
use uuid::Uuid;

use crate::store::PlanStore;

// Store double for handler tests
mock! {
    pub PlanStore {}

    #[async_trait]
    impl PlanStore for PlanStore {
        async fn get_task(&self, organization_id: Uuid, task_id: Uuid) -> eyre::Result<Option<Task>>;

        async fn list_assignments(&self, task_id: Uuid) -> eyre::Result<Vec<Assignment>>;

        async fn get_events(
            &self,
            organization_id: Uuid,
            event_ids: &[String],
        ) -> eyre::Result<HashMap<String, EventDetails>>;

        async fn get_plan(&self, organization_id: Uuid, plan_id: Uuid) -> eyre::Result<Option<Plan>>;

        async fn list_service_items(&self, plan_id: Uuid) -> eyre::Result<Vec<ServiceItemEntry>>;

        async fn update_positions(&self, plan_id: Uuid, changes: &[PositionChange]) -> eyre::Result<()>;

        async fn delete_service_item(
            &self,
            plan_id: Uuid,
            item_id: Uuid,
            compaction: &[PositionChange],
        ) -> eyre::Result<()>;
    }
}
