use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::User;

/// A stored account: the public user plus its password hash.
///
/// This type never crosses the module boundary; only `User` does.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// Insert failures the service reacts to. Everything else rides on `Other`.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("email already taken")]
    DuplicateEmail,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Load a user plus password hash by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Insert a fully-formed record.
    ///
    /// Service computes id/timestamps/hash; repo persists. The insert is
    /// atomic: a unique-index hit on email maps to `RepoError::DuplicateEmail`
    /// with no pre-check read.
    async fn insert(&self, rec: UserRecord) -> Result<(), RepoError>;
}
