use std::collections::HashMap;

use crate::models::DbServiceItem;
use eyre::{Report, Result, WrapErr};
use serviceplan_core::{
    errors::{PlanError, PlanResult},
    models::plan::PositionChange,
};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

pub async fn list_service_items(pool: &Pool<Postgres>, plan_id: Uuid) -> Result<Vec<DbServiceItem>> {
    tracing::debug!("Listing service items for plan {}", plan_id);

    let items = sqlx::query_as::<_, DbServiceItem>(
        r#"
        SELECT id, plan_id, sequence_number, title, kind, duration_minutes, notes, created_at
        FROM service_items
        WHERE plan_id = $1
        ORDER BY sequence_number, created_at
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!("Found {} service items for plan {}", items.len(), plan_id);
    Ok(items)
}

/// Writes every position change inside one transaction. The plan's rows are
/// locked first and each change must start from the position currently
/// stored, otherwise the plan was edited concurrently and nothing is
/// written. The unique `(plan_id, sequence_number)` constraint is deferred,
/// so intermediate duplicates are allowed until commit.
pub async fn update_positions(
    pool: &Pool<Postgres>,
    plan_id: Uuid,
    changes: &[PositionChange],
) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }

    tracing::debug!("Updating {} positions in plan {}", changes.len(), plan_id);

    let mut tx = pool.begin().await?;
    let current = lock_positions(&mut tx, plan_id).await?;
    verify_changes(&current, changes).map_err(Report::new)?;

    apply_positions(&mut tx, plan_id, changes).await?;
    tx.commit()
        .await
        .map_err(|e| commit_error(e, "Failed to commit position updates"))?;

    Ok(())
}

/// Deletes an item and compacts the remaining positions atomically.
pub async fn delete_service_item(
    pool: &Pool<Postgres>,
    plan_id: Uuid,
    item_id: Uuid,
    compaction: &[PositionChange],
) -> Result<()> {
    tracing::debug!("Deleting service item {} from plan {}", item_id, plan_id);

    let mut tx = pool.begin().await?;
    let current = lock_positions(&mut tx, plan_id).await?;
    if !current.contains_key(&item_id) {
        return Err(Report::new(PlanError::NotFound(format!(
            "Service item {} not found in plan {}",
            item_id, plan_id
        ))));
    }
    verify_changes(&current, compaction).map_err(Report::new)?;

    sqlx::query(
        r#"
        DELETE FROM service_items
        WHERE id = $1 AND plan_id = $2
        "#,
    )
    .bind(item_id)
    .bind(plan_id)
    .execute(&mut *tx)
    .await?;

    apply_positions(&mut tx, plan_id, compaction).await?;
    tx.commit()
        .await
        .map_err(|e| commit_error(e, "Failed to commit service item removal"))?;

    Ok(())
}

/// Checks that every change starts from the stored position of its item.
/// `current` maps item ids to their stored sequence numbers.
pub fn verify_changes(current: &HashMap<Uuid, i32>, changes: &[PositionChange]) -> PlanResult<()> {
    for change in changes {
        let stored = current.get(&change.id).copied();
        if stored.and_then(|position| usize::try_from(position).ok()) != Some(change.from) {
            return Err(PlanError::Conflict(format!(
                "Service item {} is no longer at position {}; reload the plan and try again",
                change.id, change.from
            )));
        }
    }

    Ok(())
}

async fn lock_positions(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
) -> Result<HashMap<Uuid, i32>> {
    let rows = sqlx::query_as::<_, (Uuid, i32)>(
        r#"
        SELECT id, sequence_number
        FROM service_items
        WHERE plan_id = $1
        FOR UPDATE
        "#,
    )
    .bind(plan_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().collect())
}

async fn apply_positions(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    changes: &[PositionChange],
) -> Result<()> {
    for change in changes {
        let position = i32::try_from(change.to)
            .wrap_err_with(|| format!("Position {} is out of range", change.to))?;

        sqlx::query(
            r#"
            UPDATE service_items
            SET sequence_number = $1
            WHERE id = $2 AND plan_id = $3
            "#,
        )
        .bind(position)
        .bind(change.id)
        .bind(plan_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// A unique violation at commit means another edit claimed the same
/// position in the meantime.
fn commit_error(err: sqlx::Error, context: &'static str) -> Report {
    if let sqlx::Error::Database(db_error) = &err {
        if db_error.is_unique_violation() {
            return Report::new(PlanError::Conflict(
                "Service plan was changed concurrently; reload the plan and try again".to_string(),
            ));
        }
    }
    Report::new(err).wrap_err(context)
}
