use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation failed")]
    Validation(Vec<Violation>),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation(violations)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// JSON envelope for every error response.
///
/// `request_id` is filled by handlers that have the id at hand (e.g. the 404
/// fallback); error conversions leave it out and rely on the response header.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
    #[cfg(feature = "debug-errors")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: None,
            violations: None,
            #[cfg(feature = "debug-errors")]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        let (status, code): (StatusCode, &'static str) = match &self {
            BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        match &self {
            Internal(err) => tracing::error!(
                error = %err,
                source = ?err.source(),
                status = status.as_u16(),
                "request failed"
            ),
            other => tracing::warn!(
                error = %other,
                status = status.as_u16(),
                "request failed"
            ),
        }

        let mut body = ErrorBody::new(code, self.to_string());
        if let Validation(violations) = &self {
            body.violations = Some(violations.clone());
        }
        #[cfg(feature = "debug-errors")]
        if let Internal(err) = &self {
            body.details = Some(format!("{err:#}"));
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_generic() {
        let err = ApiError::validation(vec![Violation {
            field: "name".into(),
            message: "Name is required".into(),
        }]);
        assert_eq!(err.to_string(), "Validation failed");
    }

    #[test]
    fn constructor_helpers_build_expected_variants() {
        assert!(matches!(
            ApiError::not_found("Item not found"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::conflict("SKU already exists"),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::internal(anyhow::anyhow!("boom")),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn error_body_skips_absent_fields() {
        let body = ErrorBody::new("not_found", "Resource not found");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "not_found");
        assert!(json.get("request_id").is_none());
        assert!(json.get("violations").is_none());
    }
}
