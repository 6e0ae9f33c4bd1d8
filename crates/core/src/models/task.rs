use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{PlanError, PlanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    RehearsalPoll,
    Availability,
    Acknowledgement,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::RehearsalPoll => "rehearsal_poll",
            TaskKind::Availability => "availability",
            TaskKind::Acknowledgement => "acknowledgement",
        }
    }
}

impl FromStr for TaskKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rehearsal_poll" => Ok(TaskKind::RehearsalPoll),
            "availability" => Ok(TaskKind::Availability),
            "acknowledgement" => Ok(TaskKind::Acknowledgement),
            other => Err(PlanError::Validation(format!("Unknown task kind: {other}"))),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub title: String,
    pub kind: TaskKind,
    pub config: Value,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Interprets the stored configuration according to the task kind.
    pub fn parsed_config(&self) -> PlanResult<TaskConfig> {
        let config = match self.kind {
            TaskKind::RehearsalPoll => TaskConfig::RehearsalPoll(parse_config(&self.config)?),
            TaskKind::Availability => TaskConfig::Availability(parse_config(&self.config)?),
            TaskKind::Acknowledgement => TaskConfig::Acknowledgement(parse_config(&self.config)?),
        };
        Ok(config)
    }
}

fn parse_config<T: for<'de> Deserialize<'de>>(config: &Value) -> PlanResult<T> {
    T::deserialize(config).map_err(|e| PlanError::InvalidConfig(e.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskConfig {
    RehearsalPoll(RehearsalPollConfig),
    Availability(AvailabilityConfig),
    Acknowledgement(AcknowledgementConfig),
}

/// Stored shape of a rehearsal poll configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehearsalPollConfig {
    pub days: Vec<String>,
    pub time_start: String,
    pub time_end: String,
    pub interval_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    pub event_ids: Vec<String>,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgementConfig {
    #[serde(default)]
    pub message: String,
}

/// Details of an event referenced by an availability task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: String,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
}
