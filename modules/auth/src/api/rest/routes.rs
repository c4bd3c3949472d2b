use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the auth sub-router. The server mounts it under `/api/auth` and
/// installs the `TokenService` extension for the whole API tree.
pub fn routes(service: Arc<Service>) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me))
        .layer(Extension(service))
}
