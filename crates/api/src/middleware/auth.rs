//! # Authentication Module
//!
//! Requests reach the API through a gateway that has already authenticated
//! the caller. The gateway forwards the caller's identity in three headers,
//! which [`CurrentActor`] turns into an [`Actor`].

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use serviceplan_core::{
    errors::{PlanError, PlanResult},
    models::actor::{Actor, Role},
};
use uuid::Uuid;

use super::error_handling::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor for the authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(actor_from_headers(&parts.headers)?))
    }
}

pub fn actor_from_headers(headers: &HeaderMap) -> PlanResult<Actor> {
    let user_id = header_value(headers, USER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| PlanError::Authentication(format!("Invalid {} header", USER_ID_HEADER)))?;
    let organization_id = header_value(headers, ORGANIZATION_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| {
            PlanError::Authentication(format!("Invalid {} header", ORGANIZATION_ID_HEADER))
        })?;
    let role = header_value(headers, USER_ROLE_HEADER)?.parse::<Role>()?;

    Ok(Actor {
        user_id,
        organization_id,
        role,
    })
}

/// Only admins and planners may change the order of a plan.
pub fn require_editor(actor: &Actor) -> PlanResult<()> {
    if actor.can_edit_plans() {
        Ok(())
    } else {
        Err(PlanError::Authorization(
            "Only admins and planners can edit service plans".to_string(),
        ))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> PlanResult<&'a str> {
    headers
        .get(name)
        .ok_or_else(|| PlanError::Authentication(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| PlanError::Authentication(format!("Invalid {} header", name)))
}
