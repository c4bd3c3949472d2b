use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Pure account model for cross-module use (no serde).
///
/// The password hash never leaves the auth module; it lives only in the
/// storage layer and in [`crate::domain::repo::UserRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for registering a new account. `password` is the raw secret;
/// the service hashes it before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login credentials as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
