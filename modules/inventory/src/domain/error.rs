use api_core::Violation;
use thiserror::Error;
use uuid::Uuid;

/// What the caller was trying to do with an item it does not own.
///
/// Carried inside [`DomainError::Forbidden`] so the REST layer can phrase
/// the refusal per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Access,
    Update,
    Delete,
}

impl ItemAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemAction::Access => "access",
            ItemAction::Update => "update",
            ItemAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ItemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inventory domain errors.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Item not found: {id}")]
    ItemNotFound { id: Uuid },

    #[error("Not authorized to {action} this item")]
    Forbidden { action: ItemAction },

    #[error("SKU already exists")]
    DuplicateSku,

    #[error("Validation failed")]
    Validation { violations: Vec<Violation> },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn item_not_found(id: Uuid) -> Self {
        Self::ItemNotFound { id }
    }

    pub fn forbidden(action: ItemAction) -> Self {
        Self::Forbidden { action }
    }

    pub fn duplicate_sku() -> Self {
        Self::DuplicateSku
    }

    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation { violations }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
