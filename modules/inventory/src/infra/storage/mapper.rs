use anyhow::Context;

use crate::contract::model::{Category, Item};
use crate::infra::storage::entity::Model as ItemRow;

/// Convert a database row to the contract model.
///
/// The category column is free text at the storage level; a value outside
/// the known set means the row was written by something else and is
/// surfaced as an error rather than coerced.
pub fn row_to_item(row: ItemRow) -> anyhow::Result<Item> {
    let category = row
        .category
        .parse::<Category>()
        .with_context(|| format!("item {} has an unknown category", row.id))?;

    Ok(Item {
        id: row.id,
        name: row.name,
        description: row.description,
        category,
        quantity: row.quantity,
        price: row.price,
        sku: row.sku,
        low_stock_threshold: row.low_stock_threshold,
        owner_id: row.owner_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
