use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Planner,
    Musician,
}

impl FromStr for Role {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "planner" => Ok(Role::Planner),
            "musician" => Ok(Role::Musician),
            other => Err(PlanError::Authentication(format!("Unknown role: {other}"))),
        }
    }
}

/// The authenticated user on whose behalf a request runs, as supplied by the
/// identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn can_edit_plans(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Planner)
    }
}
