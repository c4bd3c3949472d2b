use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::{json, Value};

use crate::error::ErrorBody;
use crate::request_id::XRequestId;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// JSON 404 for routes nothing matched; wired in via `Router::fallback`.
pub async fn not_found(request_id: Option<Extension<XRequestId>>) -> Response {
    let mut body = ErrorBody::new("not_found", "Route not found");
    body.request_id = request_id.map(|Extension(XRequestId(rid))| rid);
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
