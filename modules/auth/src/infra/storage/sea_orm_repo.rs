//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::repo::{RepoError, UserRecord, UsersRepository};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};
use crate::infra::storage::mapper;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(mapper::row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(mapper::row_to_record))
    }

    async fn insert(&self, rec: UserRecord) -> Result<(), RepoError> {
        let m = UserAM {
            id: Set(rec.user.id),
            name: Set(rec.user.name),
            email: Set(rec.user.email),
            password_hash: Set(rec.password_hash),
            role: Set(rec.user.role),
            created_at: Set(rec.user.created_at),
            updated_at: Set(rec.user.updated_at),
        };
        match m.insert(&self.conn).await {
            Ok(_) => Ok(()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepoError::DuplicateEmail)
            }
            Err(err) => Err(RepoError::Other(
                anyhow::Error::new(err).context("insert failed"),
            )),
        }
    }
}
