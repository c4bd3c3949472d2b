use std::sync::Arc;

use api_core::ApiError;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tracing::debug;
use uuid::Uuid;

use crate::domain::token::TokenService;

/// Authenticated caller, extracted from `Authorization: Bearer <jwt>`.
///
/// Requires an `Extension<Arc<TokenService>>` layer on the router; the
/// server installs it once for the whole `/api` tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tokens = parts
            .extensions
            .get::<Arc<TokenService>>()
            .cloned()
            .ok_or_else(|| {
                ApiError::internal(anyhow::anyhow!("TokenService extension not installed"))
            })?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

        let user_id = tokens.verify(token).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            ApiError::unauthorized("Not authorized, token failed")
        })?;

        Ok(Identity { user_id })
    }
}
