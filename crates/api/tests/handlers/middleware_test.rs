use axum::http::{HeaderMap, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serviceplan_api::middleware::{
    auth::{actor_from_headers, require_editor},
    error_handling::{AppError, map_error},
};
use serviceplan_core::{
    errors::PlanError,
    models::actor::{Actor, Role},
};
use uuid::Uuid;

#[rstest]
#[case(PlanError::NotFound("plan".into()), StatusCode::NOT_FOUND)]
#[case(PlanError::Validation("index".into()), StatusCode::BAD_REQUEST)]
#[case(PlanError::InvalidConfig("interval".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(PlanError::MalformedResponse("slots".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(PlanError::Conflict("stale".into()), StatusCode::CONFLICT)]
#[case(PlanError::Authentication("header".into()), StatusCode::UNAUTHORIZED)]
#[case(PlanError::Authorization("role".into()), StatusCode::FORBIDDEN)]
#[case(PlanError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    PlanError::Internal(Box::new(std::io::Error::other("boom"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: PlanError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[test]
fn test_eyre_reports_become_database_errors() {
    let error = AppError::from(eyre::eyre!("pool timed out"));

    assert!(matches!(error.0, PlanError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_domain_errors_inside_reports_keep_their_status() {
    let not_found = AppError::from(eyre::Report::new(PlanError::NotFound("item".into())));
    let conflict = AppError::from(eyre::Report::new(PlanError::Conflict("stale".into())));

    assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
}

fn headers(user_id: &str, organization_id: &str, role: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", HeaderValue::from_str(user_id).unwrap());
    headers.insert("x-organization-id", HeaderValue::from_str(organization_id).unwrap());
    headers.insert("x-user-role", HeaderValue::from_str(role).unwrap());
    headers
}

#[test]
fn test_actor_from_headers() {
    let user_id = Uuid::new_v4();
    let organization_id = Uuid::new_v4();

    let actor = actor_from_headers(&headers(
        &user_id.to_string(),
        &organization_id.to_string(),
        "Planner",
    ))
    .unwrap();

    assert_eq!(
        actor,
        Actor {
            user_id,
            organization_id,
            role: Role::Planner,
        }
    );
}

#[rstest]
#[case("not-a-uuid", "b7b0b1c2-0000-4000-8000-000000000001", "admin")]
#[case("b7b0b1c2-0000-4000-8000-000000000001", "", "admin")]
#[case("b7b0b1c2-0000-4000-8000-000000000001", "b7b0b1c2-0000-4000-8000-000000000002", "deacon")]
fn test_invalid_identity_headers(
    #[case] user_id: &str,
    #[case] organization_id: &str,
    #[case] role: &str,
) {
    assert!(matches!(
        actor_from_headers(&headers(user_id, organization_id, role)),
        Err(PlanError::Authentication(_))
    ));
}

#[test]
fn test_missing_identity_headers() {
    assert!(matches!(
        actor_from_headers(&HeaderMap::new()),
        Err(PlanError::Authentication(_))
    ));
}

#[rstest]
#[case(Role::Admin, true)]
#[case(Role::Planner, true)]
#[case(Role::Musician, false)]
fn test_require_editor(#[case] role: Role, #[case] allowed: bool) {
    let actor = Actor {
        user_id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        role,
    };

    let result = require_editor(&actor);

    assert_eq!(result.is_ok(), allowed);
    if !allowed {
        assert!(matches!(result, Err(PlanError::Authorization(_))));
    }
}
