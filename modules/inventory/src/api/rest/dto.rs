use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{InventoryStats, Item, ItemPatch, NewItem};

/// REST DTO for the full item representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: i32,
    /// Serialized as a string to keep the exact decimal value; numbers are
    /// accepted on input.
    pub price: Decimal,
    pub sku: String,
    pub low_stock_threshold: i32,
    pub is_low_stock: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for item creation.
///
/// Missing string fields default to empty so that field-level validation
/// reports them instead of a deserialization failure; optional numbers stay
/// `None` until the domain fills in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateItemReq {
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

/// REST DTO for partial item updates. Absent fields are left untouched;
/// unknown fields (ownerId, createdAt, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateItemReq {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItemsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub low_stock: Option<String>,
    pub sort: Option<String>,
}

/// REST DTO for list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListDto {
    pub items: Vec<ItemDto>,
    pub total: usize,
}

/// REST DTO for the stats summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStatsDto {
    pub total_items: u64,
    pub total_value: Decimal,
    pub low_stock_items: u64,
    pub out_of_stock_items: u64,
    /// Only categories that actually have items appear here.
    pub category_counts: BTreeMap<String, u64>,
}

// Conversion implementations between REST DTOs and contract models

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        let is_low_stock = item.is_low_stock();
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            category: item.category.to_string(),
            quantity: item.quantity,
            price: item.price,
            sku: item.sku,
            low_stock_threshold: item.low_stock_threshold,
            is_low_stock,
            owner_id: item.owner_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<CreateItemReq> for NewItem {
    fn from(req: CreateItemReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category,
            quantity: req.quantity,
            price: req.price,
            sku: req.sku,
            low_stock_threshold: req.low_stock_threshold,
        }
    }
}

impl From<UpdateItemReq> for ItemPatch {
    fn from(req: UpdateItemReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            category: req.category,
            quantity: req.quantity,
            price: req.price,
            sku: req.sku,
            low_stock_threshold: req.low_stock_threshold,
        }
    }
}

impl From<InventoryStats> for InventoryStatsDto {
    fn from(stats: InventoryStats) -> Self {
        Self {
            total_items: stats.total_items,
            total_value: stats.total_value,
            low_stock_items: stats.low_stock_items,
            out_of_stock_items: stats.out_of_stock_items,
            category_counts: stats
                .category_counts
                .into_iter()
                .map(|(category, count)| (category.to_string(), count))
                .collect(),
        }
    }
}
