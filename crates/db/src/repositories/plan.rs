use crate::models::DbPlan;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_plan(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    plan_id: Uuid,
) -> Result<Option<DbPlan>> {
    tracing::debug!("Getting plan {} for organization {}", plan_id, organization_id);

    let plan = sqlx::query_as::<_, DbPlan>(
        r#"
        SELECT id, organization_id, title, service_date, created_at
        FROM plans
        WHERE id = $1 AND organization_id = $2
        "#,
    )
    .bind(plan_id)
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(plan)
}

/// Plans referenced by an availability task. Ids that belong to another
/// organization or do not exist are simply absent from the result.
pub async fn get_plans_by_ids(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    plan_ids: &[Uuid],
) -> Result<Vec<DbPlan>> {
    if plan_ids.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!("Getting {} plans for organization {}", plan_ids.len(), organization_id);

    let plans = sqlx::query_as::<_, DbPlan>(
        r#"
        SELECT id, organization_id, title, service_date, created_at
        FROM plans
        WHERE organization_id = $1 AND id = ANY($2)
        ORDER BY service_date
        "#,
    )
    .bind(organization_id)
    .bind(plan_ids)
    .fetch_all(pool)
    .await?;

    Ok(plans)
}
