use api_core::ApiError;

use crate::domain::error::DomainError;

/// Map a domain error to the shared HTTP error envelope.
///
/// `UserNotFound` maps to 401 here: the only lookup by id this module
/// serves is `GET /me`, where a missing row means the token's subject no
/// longer exists.
pub fn map_domain_error(e: DomainError) -> ApiError {
    match e {
        DomainError::UserNotFound { .. } => ApiError::unauthorized("User not found"),
        DomainError::EmailAlreadyExists { .. } => {
            ApiError::conflict("User already exists with this email")
        }
        DomainError::AuthFailed => ApiError::unauthorized("Invalid email or password"),
        DomainError::Validation { violations } => ApiError::validation(violations),
        e @ (DomainError::PasswordHash { .. } | DomainError::Database { .. }) => {
            ApiError::internal(e)
        }
    }
}
