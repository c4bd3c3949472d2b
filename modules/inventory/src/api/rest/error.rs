use api_core::ApiError;

use crate::domain::error::DomainError;

/// Map a domain error to the shared HTTP error envelope.
pub fn map_domain_error(e: DomainError) -> ApiError {
    match e {
        DomainError::ItemNotFound { .. } => ApiError::not_found("Item not found"),
        DomainError::Forbidden { action } => {
            ApiError::forbidden(format!("Not authorized to {action} this item"))
        }
        DomainError::DuplicateSku => ApiError::conflict("SKU already exists"),
        DomainError::Validation { violations } => ApiError::validation(violations),
        e @ DomainError::Database { .. } => ApiError::internal(e),
    }
}
