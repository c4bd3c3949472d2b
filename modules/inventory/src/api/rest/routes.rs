use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the items sub-router. The server mounts it under `/api/items`;
/// every route requires a bearer token.
pub fn routes(service: Arc<Service>) -> Router {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/stats/summary", get(handlers::stats_summary))
        .layer(Extension(service))
}
