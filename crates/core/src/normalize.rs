//! Canonicalization of stored response payloads.
//!
//! Rehearsal selections have been stored both as composite keys
//! (`"Monday-18:00"`) and as `{ "day": .., "time": .. }` objects; both are
//! accepted and turned into [`Slot`] values here, which is the only place a
//! composite key is ever split.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    errors::{PlanError, PlanResult},
    models::{
        assignment::{Acknowledgement, Availability, AvailabilityChoices, RehearsalSelection},
        slot::{Day, Slot, parse_time_of_day},
    },
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSlot {
    Composite(String),
    Pair { day: String, time: String },
}

#[derive(Debug, Deserialize)]
struct RawRehearsalResponse {
    #[serde(default)]
    selected_slots: Vec<RawSlot>,
}

pub fn normalize_rehearsal(raw: &Value) -> PlanResult<RehearsalSelection> {
    let response = RawRehearsalResponse::deserialize(raw)
        .map_err(|e| PlanError::MalformedResponse(e.to_string()))?;

    let slots = response
        .selected_slots
        .iter()
        .map(normalize_slot)
        .collect::<PlanResult<BTreeSet<_>>>()?;

    Ok(RehearsalSelection { slots })
}

fn normalize_slot(raw: &RawSlot) -> PlanResult<Slot> {
    let (day, time) = match raw {
        RawSlot::Composite(key) => key
            .split_once('-')
            .ok_or_else(|| PlanError::MalformedResponse(format!("Unrecognized slot key {key:?}")))?,
        RawSlot::Pair { day, time } => (day.as_str(), time.as_str()),
    };

    let day = day
        .parse::<Day>()
        .map_err(|_| PlanError::MalformedResponse(format!("Unknown day {day:?}")))?;
    let time = parse_time_of_day(time)
        .ok_or_else(|| PlanError::MalformedResponse(format!("Invalid time {time:?}")))?;

    Ok(Slot::new(day, time))
}

/// Values other than `YES`, `NO` and `MAYBE` count as no choice for that
/// event. A response object without `availabilities` records no choices.
pub fn normalize_availability(raw: &Value) -> PlanResult<AvailabilityChoices> {
    let response = raw.as_object().ok_or_else(|| {
        PlanError::MalformedResponse("Expected an availability response object".to_string())
    })?;

    let entries = match response.get("availabilities") {
        None | Some(Value::Null) => return Ok(AvailabilityChoices::default()),
        Some(entries) => entries.as_object().ok_or_else(|| {
            PlanError::MalformedResponse("Expected an `availabilities` object".to_string())
        })?,
    };

    let choices: HashMap<String, Availability> = entries
        .iter()
        .filter_map(|(event_id, value)| {
            value
                .as_str()
                .and_then(Availability::from_code)
                .map(|choice| (event_id.clone(), choice))
        })
        .collect();

    Ok(AvailabilityChoices { choices })
}

pub fn normalize_acknowledgement(raw: &Value) -> PlanResult<Acknowledgement> {
    if !raw.is_object() {
        return Err(PlanError::MalformedResponse(
            "Expected an acknowledgement object".to_string(),
        ));
    }
    Acknowledgement::deserialize(raw).map_err(|e| PlanError::MalformedResponse(e.to_string()))
}
