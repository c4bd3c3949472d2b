use crate::contract::model::User;
use crate::domain::repo::UserRecord;
use crate::infra::storage::entity::Model as UserRow;

/// Convert a database row to the contract model (hash stripped).
pub fn row_to_user(row: UserRow) -> User {
    User {
        id: row.id,
        name: row.name,
        email: row.email,
        role: row.role,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Convert a database row to the repo record (hash kept).
pub fn row_to_record(row: UserRow) -> UserRecord {
    let password_hash = row.password_hash.clone();
    UserRecord {
        user: row_to_user(row),
        password_hash,
    }
}
