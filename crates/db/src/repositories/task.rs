use crate::models::{DbAssignment, DbTask};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_task(
    pool: &Pool<Postgres>,
    organization_id: Uuid,
    task_id: Uuid,
) -> Result<Option<DbTask>> {
    tracing::debug!("Getting task {} for organization {}", task_id, organization_id);

    let task = sqlx::query_as::<_, DbTask>(
        r#"
        SELECT id, organization_id, plan_id, title, kind, config, created_at
        FROM tasks
        WHERE id = $1 AND organization_id = $2
        "#,
    )
    .bind(task_id)
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

pub async fn list_assignments(pool: &Pool<Postgres>, task_id: Uuid) -> Result<Vec<DbAssignment>> {
    tracing::debug!("Listing assignments for task {}", task_id);

    let assignments = sqlx::query_as::<_, DbAssignment>(
        r#"
        SELECT a.id, a.task_id, a.participant_id, p.display_name,
               a.status, a.response_data, a.updated_at
        FROM task_assignments a
        JOIN profiles p ON p.id = a.participant_id
        WHERE a.task_id = $1
        ORDER BY a.created_at, a.id
        "#,
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!("Found {} assignments for task {}", assignments.len(), task_id);
    Ok(assignments)
}
