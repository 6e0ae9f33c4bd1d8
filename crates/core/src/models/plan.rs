use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub service_date: DateTime<Utc>,
}

/// Element of a sequenced collection.
///
/// Within one collection `sequence_position` values run `0..n` without gaps
/// or duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem<T> {
    pub id: Uuid,
    pub sequence_position: usize,
    pub payload: T,
}

impl<T> OrderedItem<T> {
    pub fn new(id: Uuid, sequence_position: usize, payload: T) -> Self {
        Self {
            id,
            sequence_position,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceItemKind {
    Song,
    Scripture,
    Announcement,
    Other,
}

impl ServiceItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceItemKind::Song => "song",
            ServiceItemKind::Scripture => "scripture",
            ServiceItemKind::Announcement => "announcement",
            ServiceItemKind::Other => "other",
        }
    }
}

/// Unrecognized kinds fall back to `Other`.
impl FromStr for ServiceItemKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "song" => ServiceItemKind::Song,
            "scripture" => ServiceItemKind::Scripture,
            "announcement" => ServiceItemKind::Announcement,
            _ => ServiceItemKind::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub title: String,
    pub kind: ServiceItemKind,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

pub type ServiceItemEntry = OrderedItem<ServiceItem>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: Uuid,
    pub from: usize,
    pub to: usize,
}
