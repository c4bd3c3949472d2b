use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::request_id;

/// Wrap a router with the standard middleware stack.
///
/// Layers are added innermost-first (`.layer` wraps everything added before
/// it), so the request passes through: body limit -> CORS -> set request id ->
/// propagate request id -> trace -> extensions push -> timeout -> routes.
/// The id must be set before the trace span opens, otherwise generated ids
/// never show up in spans.
pub fn apply_middleware(mut router: Router, cors_enabled: bool, request_timeout: Duration) -> Router {
    let x_request_id = request_id::header();

    // Timeout sits closest to the handlers so timeouts are still traced.
    router = router.layer(TimeoutLayer::new(request_timeout));

    // Put request_id into extensions and record it in the open span.
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));

    // Trace with request_id/status/latency.
    router = router.layer(request_id::create_trace_layer());

    // Copy x-request-id onto the response.
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

    // Generate x-request-id when the client didn't send one.
    router = router.layer(SetRequestIdLayer::new(
        x_request_id,
        request_id::MakeReqId,
    ));

    // CORS (if enabled)
    if cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    // Body limit - 16MB default limit
    router = router.layer(RequestBodyLimitLayer::new(16 * 1024 * 1024));

    router
}
