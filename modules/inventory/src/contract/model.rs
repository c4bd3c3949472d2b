use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The closed set of item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Electronics,
    Clothing,
    Food,
    Furniture,
    Books,
    Toys,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Food => "Food",
            Category::Furniture => "Furniture",
            Category::Books => "Books",
            Category::Toys => "Toys",
            Category::Other => "Other",
        }
    }

    /// First three letters, uppercased. Every variant name is long enough.
    pub fn sku_prefix(&self) -> String {
        self.as_str()[..3].to_ascii_uppercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected category value; `Display` doubles as the client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCategory(pub String);

impl fmt::Display for InvalidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid category", self.0)
    }
}

impl std::error::Error for InvalidCategory {}

impl FromStr for Category {
    type Err = InvalidCategory;

    // Case-sensitive, matching the closed enum exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(Category::Electronics),
            "Clothing" => Ok(Category::Clothing),
            "Food" => Ok(Category::Food),
            "Furniture" => Ok(Category::Furniture),
            "Books" => Ok(Category::Books),
            "Toys" => Ok(Category::Toys),
            "Other" => Ok(Category::Other),
            other => Err(InvalidCategory(other.to_string())),
        }
    }
}

/// Pure inventory item model for cross-module use (no serde).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub quantity: i32,
    pub price: Decimal,
    pub sku: String,
    pub low_stock_threshold: i32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Boundary equality counts as low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Raw data for creating an item. `category` stays a string until
/// validation; `quantity` and `low_stock_threshold` fall back to their
/// defaults (0 and 10) when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

/// Partial update. Owner and creation time are not representable here,
/// so they cannot be changed through the API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

/// Inventory roll-up over one owner's items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryStats {
    pub total_items: u64,
    pub total_value: Decimal,
    pub low_stock_items: u64,
    pub out_of_stock_items: u64,
    pub category_counts: BTreeMap<Category, u64>,
}
