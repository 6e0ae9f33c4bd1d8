//! # Response Aggregation
//!
//! Folds the assignments of a task into the summaries shown to organizers:
//!
//! - rehearsal polls become a per-slot heat map with rosters,
//! - availability requests become per-event buckets,
//! - acknowledgements become acknowledged / pending rosters.
//!
//! Only `COMPLETED` assignments contribute. A payload that cannot be
//! normalized is logged and skipped; that participant is reported as not
//! having responded and every other participant is still counted. Rosters
//! follow the order of the input assignments.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    errors::PlanError,
    models::{
        assignment::{Assignment, Availability, AvailabilityChoices, RehearsalSelection},
        slot::Slot,
        task::EventDetails,
    },
    normalize::{normalize_acknowledgement, normalize_availability, normalize_rehearsal},
    slots::SlotGrid,
};

/// A response that was left out of a report because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedResponse {
    pub assignment_id: Uuid,
    pub participant_id: Uuid,
    pub display_name: String,
    pub reason: String,
}

impl SkippedResponse {
    fn new(assignment: &Assignment, error: &PlanError) -> Self {
        warn!(
            "Skipping response of assignment {} ({}): {}",
            assignment.id, assignment.participant.display_name, error
        );
        Self {
            assignment_id: assignment.id,
            participant_id: assignment.participant.id,
            display_name: assignment.participant.display_name.clone(),
            reason: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotTally {
    pub slot: Slot,
    pub count: usize,
    pub roster: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RehearsalSummary {
    /// One entry per slot of the grid, day first then time.
    pub slots: Vec<SlotTally>,
    pub max_count: usize,
    pub total_responded: usize,
    pub responded: Vec<String>,
    pub not_responded: Vec<String>,
    pub skipped: Vec<SkippedResponse>,
}

impl RehearsalSummary {
    pub fn tally(&self, slot: &Slot) -> Option<&SlotTally> {
        self.slots
            .binary_search_by(|tally| tally.slot.cmp(slot))
            .ok()
            .map(|index| &self.slots[index])
    }

    pub fn count(&self, slot: &Slot) -> usize {
        self.tally(slot).map_or(0, |tally| tally.count)
    }

    pub fn roster(&self, slot: &Slot) -> &[String] {
        self.tally(slot)
            .map(|tally| tally.roster.as_slice())
            .unwrap_or_default()
    }

    /// Counts keyed by slot id.
    pub fn per_slot_count(&self) -> HashMap<String, usize> {
        self.slots
            .iter()
            .map(|tally| (tally.slot.id(), tally.count))
            .collect()
    }

    /// Heat-map intensity in `0.0..=1.0`, relative to the busiest slot.
    pub fn intensity(&self, slot: &Slot) -> f64 {
        if self.max_count == 0 {
            return 0.0;
        }
        self.count(slot) as f64 / self.max_count as f64
    }

    /// Slots chosen by the most participants.
    pub fn best_slots(&self) -> Vec<&SlotTally> {
        if self.max_count == 0 {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter(|tally| tally.count == self.max_count)
            .collect()
    }
}

pub fn aggregate_rehearsal(grid: &SlotGrid, assignments: &[Assignment]) -> RehearsalSummary {
    let mut summary = RehearsalSummary {
        slots: grid
            .slots()
            .map(|slot| SlotTally {
                slot,
                count: 0,
                roster: Vec::new(),
            })
            .collect(),
        ..RehearsalSummary::default()
    };
    let mut responded_ids = HashSet::new();

    for assignment in assignments {
        let name = &assignment.participant.display_name;

        if !assignment.is_completed() {
            summary.not_responded.push(name.clone());
            continue;
        }

        let selection = match assignment.response() {
            Some(raw) => match normalize_rehearsal(raw) {
                Ok(selection) => selection,
                Err(error) => {
                    summary.skipped.push(SkippedResponse::new(assignment, &error));
                    summary.not_responded.push(name.clone());
                    continue;
                }
            },
            None => RehearsalSelection::default(),
        };

        for slot in &selection.slots {
            let Some(index) = grid.position(slot) else {
                debug!("Ignoring slot {} outside of the poll grid", slot);
                continue;
            };
            let tally = &mut summary.slots[index];
            tally.count += 1;
            tally.roster.push(name.clone());
            summary.max_count = summary.max_count.max(tally.count);
        }

        if responded_ids.insert(assignment.participant.id) {
            summary.responded.push(name.clone());
        }
    }

    summary.total_responded = responded_ids.len();
    summary
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTally {
    pub event_id: String,
    pub label: String,
    pub starts_at: Option<DateTime<Utc>>,
    /// False when the event could not be found and `label` is the raw id.
    pub resolved: bool,
    pub available: Vec<String>,
    pub unavailable: Vec<String>,
    pub maybe: Vec<String>,
    pub no_response: Vec<String>,
}

impl EventTally {
    fn new(event_id: &str, details: Option<&EventDetails>) -> Self {
        if details.is_none() {
            debug!("Event {} not found, using its id as label", event_id);
        }
        Self {
            event_id: event_id.to_string(),
            label: details.map_or_else(|| event_id.to_string(), |event| event.title.clone()),
            starts_at: details.and_then(|event| event.starts_at),
            resolved: details.is_some(),
            available: Vec::new(),
            unavailable: Vec::new(),
            maybe: Vec::new(),
            no_response: Vec::new(),
        }
    }

    fn bucket_mut(&mut self, choice: Option<Availability>) -> &mut Vec<String> {
        match choice {
            Some(Availability::Available) => &mut self.available,
            Some(Availability::Unavailable) => &mut self.unavailable,
            Some(Availability::Maybe) => &mut self.maybe,
            None => &mut self.no_response,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    pub events: Vec<EventTally>,
    pub total_responded: usize,
    pub skipped: Vec<SkippedResponse>,
}

/// Partitions participants into available / unavailable / maybe / no
/// response, separately for every event id.
pub fn aggregate_availability(
    event_ids: &[String],
    events: &HashMap<String, EventDetails>,
    assignments: &[Assignment],
) -> AvailabilityReport {
    let mut skipped = Vec::new();
    let mut responded_ids = HashSet::new();

    let normalized: Vec<(&str, Option<AvailabilityChoices>)> = assignments
        .iter()
        .map(|assignment| {
            let name = assignment.participant.display_name.as_str();
            if !assignment.is_completed() {
                return (name, None);
            }
            let choices = match assignment.response() {
                Some(raw) => match normalize_availability(raw) {
                    Ok(choices) => choices,
                    Err(error) => {
                        skipped.push(SkippedResponse::new(assignment, &error));
                        return (name, None);
                    }
                },
                None => AvailabilityChoices::default(),
            };
            responded_ids.insert(assignment.participant.id);
            (name, Some(choices))
        })
        .collect();

    let events = event_ids
        .iter()
        .map(|event_id| {
            let mut tally = EventTally::new(event_id, events.get(event_id));
            for (name, choices) in &normalized {
                let choice = choices
                    .as_ref()
                    .and_then(|choices| choices.choice_for(event_id));
                tally.bucket_mut(choice).push((*name).to_string());
            }
            tally
        })
        .collect();

    AvailabilityReport {
        events,
        total_responded: responded_ids.len(),
        skipped,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcknowledgedEntry {
    pub display_name: String,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcknowledgementSummary {
    pub acknowledged: Vec<AcknowledgedEntry>,
    pub pending: Vec<String>,
    pub skipped: Vec<SkippedResponse>,
}

pub fn aggregate_acknowledgements(assignments: &[Assignment]) -> AcknowledgementSummary {
    let mut summary = AcknowledgementSummary::default();

    for assignment in assignments {
        let name = assignment.participant.display_name.clone();
        if !assignment.is_completed() {
            summary.pending.push(name);
            continue;
        }

        let acknowledged_at = match assignment.response() {
            Some(raw) => match normalize_acknowledgement(raw) {
                Ok(acknowledgement) => acknowledgement.acknowledged_at,
                Err(error) => {
                    summary.skipped.push(SkippedResponse::new(assignment, &error));
                    summary.pending.push(name);
                    continue;
                }
            },
            None => None,
        };

        summary.acknowledged.push(AcknowledgedEntry {
            display_name: name,
            acknowledged_at,
        });
    }

    summary
}
