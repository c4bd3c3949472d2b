use std::sync::Arc;

use api_core::ApiError;
use axum::{http::StatusCode, response::Json, Extension};
use tracing::{error, info};

use crate::api::rest::dto::{AuthResponseDto, LoginReq, RegisterReq, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::Identity;
use crate::domain::service::Service;
use crate::domain::token::TokenService;

/// Register a new account and hand back a fresh token
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    Extension(tokens): Extension<Arc<TokenService>>,
    Json(req_body): Json<RegisterReq>,
) -> Result<(StatusCode, Json<AuthResponseDto>), ApiError> {
    info!(email = %req_body.email, "Register request");

    match svc.register(req_body.into()).await {
        Ok(user) => {
            let token = tokens.issue(user.id).map_err(ApiError::internal)?;
            let response = AuthResponseDto {
                user: UserDto::from(user),
                token,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Exchange credentials for a token
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    Extension(tokens): Extension<Arc<TokenService>>,
    Json(req_body): Json<LoginReq>,
) -> Result<Json<AuthResponseDto>, ApiError> {
    info!(email = %req_body.email, "Login request");

    match svc.login(req_body.into()).await {
        Ok(user) => {
            let token = tokens.issue(user.id).map_err(ApiError::internal)?;
            let response = AuthResponseDto {
                user: UserDto::from(user),
                token,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to log in: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Return the account behind the presented token
pub async fn me(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
) -> Result<Json<UserDto>, ApiError> {
    match svc.current_user(identity.user_id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to load current user: {}", e);
            Err(map_domain_error(e))
        }
    }
}
