//! Reordering of sequenced collections such as the items of a service plan.
//!
//! Every function returns items whose `sequence_position` equals their index,
//! so positions always run `0..n` without gaps or repeats.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    errors::{PlanError, PlanResult},
    models::plan::{OrderedItem, PositionChange},
};

/// Moves the item at `from` to `to`; the items in between shift by one.
pub fn resequence<T>(
    mut items: Vec<OrderedItem<T>>,
    from: usize,
    to: usize,
) -> PlanResult<Vec<OrderedItem<T>>> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(PlanError::Validation(format!(
            "Cannot move item from index {from} to index {to} in a list of {len} items"
        )));
    }

    let item = items.remove(from);
    items.insert(to, item);

    Ok(renumber(items))
}

pub fn resequence_after_removal<T>(
    mut items: Vec<OrderedItem<T>>,
    removed_id: Uuid,
) -> PlanResult<Vec<OrderedItem<T>>> {
    let index = items
        .iter()
        .position(|item| item.id == removed_id)
        .ok_or_else(|| PlanError::NotFound(format!("Item with ID {removed_id} not found")))?;

    items.remove(index);

    Ok(renumber(items))
}

/// Orders items by their stored position (ties keep input order) and closes
/// any gaps.
pub fn normalize_positions<T>(mut items: Vec<OrderedItem<T>>) -> Vec<OrderedItem<T>> {
    items.sort_by_key(|item| item.sequence_position);
    renumber(items)
}

/// Items of `after` whose position differs from the one they had in
/// `before`. Items only present on one side are ignored.
pub fn position_changes<T>(
    before: &[OrderedItem<T>],
    after: &[OrderedItem<T>],
) -> Vec<PositionChange> {
    let previous: HashMap<Uuid, usize> = before
        .iter()
        .map(|item| (item.id, item.sequence_position))
        .collect();

    after
        .iter()
        .filter_map(|item| {
            let from = *previous.get(&item.id)?;
            (from != item.sequence_position).then_some(PositionChange {
                id: item.id,
                from,
                to: item.sequence_position,
            })
        })
        .collect()
}

fn renumber<T>(items: Vec<OrderedItem<T>>) -> Vec<OrderedItem<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(position, mut item)| {
            item.sequence_position = position;
            item
        })
        .collect()
}
