use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/tasks/:id/slots", get(handlers::tasks::task_slots))
        .route("/api/tasks/:id/report", get(handlers::tasks::task_report))
}
