use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::Item;
use crate::domain::query::ItemQuery;

/// Storage-level failures the domain reacts to. Everything else travels as
/// an opaque `Other`.
#[derive(Error, Debug)]
pub enum RepoError {
    /// The unique SKU index rejected the write.
    #[error("sku already taken")]
    DuplicateSku,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence port for inventory items.
#[async_trait]
pub trait ItemsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Item>>;

    /// Inserts a fully-populated item. SKU uniqueness is enforced by the
    /// store itself, not by a racy pre-check.
    async fn insert(&self, item: Item) -> Result<(), RepoError>;

    /// Replaces an existing row keyed by `item.id`.
    async fn update(&self, item: Item) -> Result<(), RepoError>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Items belonging to `owner`, filtered and ordered per `query`.
    /// The `low_stock` flag is not applied here; rows carry their own
    /// thresholds and the domain filters on them afterwards.
    async fn list_by_owner(&self, owner: Uuid, query: &ItemQuery) -> anyhow::Result<Vec<Item>>;
}
