use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/plans/:id/items", get(handlers::plans::list_items))
        .route("/api/plans/:id/items/move", post(handlers::plans::move_item))
        .route(
            "/api/plans/:id/items/:item_id",
            delete(handlers::plans::remove_item),
        )
}
