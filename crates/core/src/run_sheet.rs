use chrono::{Duration, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    plan::{ServiceItemEntry, ServiceItemKind},
    slot::hhmm,
};

/// An item of a service plan with its scheduled start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSheetEntry {
    pub id: Uuid,
    pub sequence_position: usize,
    pub title: String,
    pub kind: ServiceItemKind,
    #[serde(with = "hhmm")]
    pub starts_at: NaiveTime,
    pub offset_minutes: u32,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

/// Lays the items out back to back from `start`, in the order given.
/// Items without a duration take no time.
pub fn run_sheet(items: &[ServiceItemEntry], start: NaiveTime) -> Vec<RunSheetEntry> {
    let mut offset_minutes = 0u32;

    items
        .iter()
        .map(|item| {
            let duration_minutes = item.payload.duration_minutes.unwrap_or(0);
            let (starts_at, _) =
                start.overflowing_add_signed(Duration::minutes(i64::from(offset_minutes)));
            let entry = RunSheetEntry {
                id: item.id,
                sequence_position: item.sequence_position,
                title: item.payload.title.clone(),
                kind: item.payload.kind,
                starts_at,
                offset_minutes,
                duration_minutes,
                notes: item.payload.notes.clone(),
            };
            offset_minutes = offset_minutes.saturating_add(duration_minutes);
            entry
        })
        .collect()
}

pub fn total_duration(items: &[ServiceItemEntry]) -> u32 {
    items
        .iter()
        .filter_map(|item| item.payload.duration_minutes)
        .fold(0, u32::saturating_add)
}
