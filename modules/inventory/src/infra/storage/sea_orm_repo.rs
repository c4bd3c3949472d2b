//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::Item;
use crate::domain::query::{ItemQuery, SortField};
use crate::domain::repo::{ItemsRepository, RepoError};
use crate::infra::storage::entity::{ActiveModel as ItemAM, Column, Entity as ItemEntity};
use crate::infra::storage::mapper;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmItemsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmItemsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring match over name and description. Both sides are lowercased so
/// the comparison is case-insensitive on every backend.
fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(LikeExpr::new(&pattern).escape('\\')))
        .add(
            Expr::expr(Func::lower(Expr::col(Column::Description)))
                .like(LikeExpr::new(&pattern).escape('\\')),
        )
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Name => Column::Name,
        SortField::Category => Column::Category,
        SortField::Quantity => Column::Quantity,
        SortField::Price => Column::Price,
        SortField::Sku => Column::Sku,
        SortField::LowStockThreshold => Column::LowStockThreshold,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
    }
}

fn item_to_active(item: Item) -> ItemAM {
    ItemAM {
        id: Set(item.id),
        name: Set(item.name),
        description: Set(item.description),
        category: Set(item.category.as_str().to_owned()),
        quantity: Set(item.quantity),
        price: Set(item.price),
        sku: Set(item.sku),
        low_stock_threshold: Set(item.low_stock_threshold),
        owner_id: Set(item.owner_id),
        created_at: Set(item.created_at),
        updated_at: Set(item.updated_at),
    }
}

#[async_trait::async_trait]
impl<C> ItemsRepository for SeaOrmItemsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Item>> {
        let found = ItemEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(mapper::row_to_item).transpose()
    }

    async fn insert(&self, item: Item) -> Result<(), RepoError> {
        match item_to_active(item).insert(&self.conn).await {
            Ok(_) => Ok(()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepoError::DuplicateSku)
            }
            Err(err) => Err(RepoError::Other(
                anyhow::Error::new(err).context("insert failed"),
            )),
        }
    }

    async fn update(&self, item: Item) -> Result<(), RepoError> {
        match item_to_active(item).update(&self.conn).await {
            Ok(_) => Ok(()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepoError::DuplicateSku)
            }
            Err(err) => Err(RepoError::Other(
                anyhow::Error::new(err).context("update failed"),
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = ItemEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_owner(&self, owner: Uuid, query: &ItemQuery) -> anyhow::Result<Vec<Item>> {
        let mut select = ItemEntity::find().filter(Column::OwnerId.eq(owner));

        if let Some(ref term) = query.search {
            select = select.filter(search_condition(term));
        }
        if let Some(category) = query.category {
            select = select.filter(Column::Category.eq(category.as_str()));
        }

        let column = sort_column(query.sort.field);
        select = if query.sort.descending {
            select.order_by_desc(column)
        } else {
            select.order_by_asc(column)
        };

        let rows = select
            .all(&self.conn)
            .await
            .context("list_by_owner failed")?;
        rows.into_iter().map(mapper::row_to_item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
