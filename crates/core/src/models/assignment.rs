use std::{
    collections::{BTreeSet, HashMap},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{errors::PlanError, models::slot::Slot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AssignmentStatus::Pending),
            "COMPLETED" => Ok(AssignmentStatus::Completed),
            other => Err(PlanError::Validation(format!("Unknown assignment status: {other}"))),
        }
    }
}

/// Link between a task and one participant.
///
/// `response_data` holds the raw payload exactly as it was last submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub participant: Participant,
    pub status: AssignmentStatus,
    pub response_data: Option<Value>,
}

impl Assignment {
    pub fn is_completed(&self) -> bool {
        self.status == AssignmentStatus::Completed
    }

    /// The stored payload. A JSON `null` is the same as no payload at all.
    pub fn response(&self) -> Option<&Value> {
        self.response_data.as_ref().filter(|raw| !raw.is_null())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "YES")]
    Available,
    #[serde(rename = "NO")]
    Unavailable,
    #[serde(rename = "MAYBE")]
    Maybe,
}

impl Availability {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "YES" => Some(Availability::Available),
            "NO" => Some(Availability::Unavailable),
            "MAYBE" => Some(Availability::Maybe),
            _ => None,
        }
    }
}

/// Normalized rehearsal poll response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehearsalSelection {
    pub slots: BTreeSet<Slot>,
}

/// Normalized event availability response; events without a recognized
/// choice are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityChoices {
    pub choices: HashMap<String, Availability>,
}

impl AvailabilityChoices {
    pub fn choice_for(&self, event_id: &str) -> Option<Availability> {
        self.choices.get(event_id).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
}
