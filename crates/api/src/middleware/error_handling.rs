//! # Error Handling Middleware
//!
//! Maps `PlanError` values to HTTP status codes and a JSON body of the form
//! `{"error": "..."}` so every handler reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use serviceplan_core::errors::PlanError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use serviceplan_api::middleware::error_handling::AppError;
/// use serviceplan_core::errors::PlanError;
/// use uuid::Uuid;
///
/// async fn handler(id: Uuid) -> Result<Json<String>, AppError> {
///     Err(AppError(PlanError::NotFound(format!("Plan with ID {} not found", id))))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub PlanError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlanError::NotFound(_) => StatusCode::NOT_FOUND,
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::InvalidConfig(_) | PlanError::MalformedResponse(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PlanError::Conflict(_) => StatusCode::CONFLICT,
            PlanError::Authentication(_) => StatusCode::UNAUTHORIZED,
            PlanError::Authorization(_) => StatusCode::FORBIDDEN,
            PlanError::Database(_) | PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage failures are logged in full but reported generically
        let message = match &self.0 {
            PlanError::Database(err) => {
                tracing::error!("Database failure: {:?}", err);
                "Database error".to_string()
            }
            PlanError::Internal(err) => {
                tracing::error!("Internal failure: {}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        AppError(err)
    }
}

/// Storage code reports domain outcomes such as a vanished row as a
/// `PlanError` inside the report; anything else is a `PlanError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        match err.downcast::<PlanError>() {
            Ok(plan_error) => AppError(plan_error),
            Err(err) => AppError(PlanError::Database(err)),
        }
    }
}

pub fn map_error(err: PlanError) -> Response {
    AppError(err).into_response()
}
