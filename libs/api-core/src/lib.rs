//! Shared HTTP plumbing for the Stockroom server: the error envelope every
//! endpoint responds with, request-id propagation, the middleware stack, and
//! the non-module routes (health check, 404 fallback).

pub mod error;
pub mod layers;
pub mod request_id;
pub mod web;

pub use error::{ApiError, ErrorBody, Violation};
pub use layers::apply_middleware;
pub use request_id::XRequestId;
