use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Category, InventoryStats, Item, ItemPatch, NewItem};
use crate::domain::error::{DomainError, ItemAction};
use crate::domain::query::ItemQuery;
use crate::domain::repo::{ItemsRepository, RepoError};
use crate::domain::{stats, validate};

/// Builds a SKU for items created without one: the category prefix plus the
/// creation instant in unix milliseconds.
pub fn derive_sku(category: Category, at: DateTime<Utc>) -> String {
    format!("{}-{}", category.sku_prefix(), at.timestamp_millis())
}

/// Inventory service: validation, ownership checks, and persistence via the
/// repository port.
pub struct Service {
    repo: Arc<dyn ItemsRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn ItemsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "inventory.service.create_item", skip(self, new_item), fields(owner = %owner))]
    pub async fn create_item(&self, owner: Uuid, new_item: NewItem) -> Result<Item, DomainError> {
        info!("Creating new item");

        let checked = validate::check_new_item(&new_item).map_err(DomainError::validation)?;

        let now = Utc::now();
        let sku = match checked.sku {
            Some(sku) => sku,
            None => derive_sku(checked.category, now),
        };

        let item = Item {
            id: Uuid::new_v4(),
            name: checked.name,
            description: checked.description,
            category: checked.category,
            quantity: checked.quantity,
            price: checked.price,
            sku,
            low_stock_threshold: checked.low_stock_threshold,
            owner_id: owner,
            created_at: now,
            updated_at: now,
        };

        match self.repo.insert(item.clone()).await {
            Ok(()) => {}
            Err(RepoError::DuplicateSku) => return Err(DomainError::duplicate_sku()),
            Err(RepoError::Other(err)) => return Err(DomainError::database(err.to_string())),
        }

        info!(item_id = %item.id, sku = %item.sku, "Item created successfully");
        Ok(item)
    }

    #[instrument(name = "inventory.service.get_item", skip(self), fields(item_id = %id))]
    pub async fn get_item(&self, caller: Uuid, id: Uuid) -> Result<Item, DomainError> {
        debug!("Fetching item");
        self.fetch_owned(caller, id, ItemAction::Access).await
    }

    /// Applies a partial update to an item the caller owns.
    ///
    /// The item is located first, so a missing or foreign id is reported
    /// even when the patch itself would not validate.
    #[instrument(name = "inventory.service.update_item", skip(self, patch), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: ItemPatch,
    ) -> Result<Item, DomainError> {
        info!("Updating item");

        let mut item = self.fetch_owned(caller, id, ItemAction::Update).await?;
        let checked = validate::check_patch(&patch).map_err(DomainError::validation)?;

        if let Some(name) = checked.name {
            item.name = name;
        }
        if let Some(description) = checked.description {
            item.description = description;
        }
        if let Some(category) = checked.category {
            item.category = category;
        }
        if let Some(quantity) = checked.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = checked.price {
            item.price = price;
        }
        if let Some(sku) = checked.sku {
            item.sku = sku;
        }
        if let Some(threshold) = checked.low_stock_threshold {
            item.low_stock_threshold = threshold;
        }
        item.updated_at = Utc::now();

        match self.repo.update(item.clone()).await {
            Ok(()) => {}
            Err(RepoError::DuplicateSku) => return Err(DomainError::duplicate_sku()),
            Err(RepoError::Other(err)) => return Err(DomainError::database(err.to_string())),
        }

        info!(item_id = %item.id, "Item updated successfully");
        Ok(item)
    }

    #[instrument(name = "inventory.service.delete_item", skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting item");

        let item = self.fetch_owned(caller, id, ItemAction::Delete).await?;
        let deleted = self
            .repo
            .delete(item.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::item_not_found(id));
        }

        info!(item_id = %id, "Item deleted successfully");
        Ok(())
    }

    #[instrument(name = "inventory.service.list_items", skip(self, query), fields(owner = %owner))]
    pub async fn list_items(&self, owner: Uuid, query: ItemQuery) -> Result<Vec<Item>, DomainError> {
        debug!("Listing items");

        let mut items = self
            .repo
            .list_by_owner(owner, &query)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        // Each row is judged against its own threshold, so this cannot be
        // pushed into the query's WHERE clause as a constant.
        if query.low_stock {
            items.retain(Item::is_low_stock);
        }

        Ok(items)
    }

    #[instrument(name = "inventory.service.stats", skip(self), fields(owner = %owner))]
    pub async fn stats(&self, owner: Uuid) -> Result<InventoryStats, DomainError> {
        debug!("Computing inventory stats");

        let items = self
            .repo
            .list_by_owner(owner, &ItemQuery::default())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(stats::summarize(&items))
    }

    /// Loads an item and checks ownership, in that order: a missing row is
    /// reported as not found even to callers who could never have owned it,
    /// while someone else's row is a refusal naming the attempted action.
    async fn fetch_owned(
        &self,
        caller: Uuid,
        id: Uuid,
        action: ItemAction,
    ) -> Result<Item, DomainError> {
        let item = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::item_not_found(id))?;

        if item.owner_id != caller {
            return Err(DomainError::forbidden(action));
        }

        Ok(item)
    }
}
