//! Field validation for item writes.
//!
//! Checks collect every violation instead of failing fast, and successful
//! checks hand back normalized values (trimmed strings, parsed category,
//! defaults filled in) so the service never re-parses raw input.

use api_core::Violation;
use rust_decimal::Decimal;

use crate::contract::model::{Category, ItemPatch, NewItem};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const DEFAULT_QUANTITY: i32 = 0;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// A validated, normalized item creation request.
#[derive(Debug, Clone)]
pub struct CheckedNewItem {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub quantity: i32,
    pub price: Decimal,
    /// `None` when the caller left it blank and one must be derived.
    pub sku: Option<String>,
    pub low_stock_threshold: i32,
}

/// A validated partial update. Only fields present here get applied.
#[derive(Debug, Clone, Default)]
pub struct CheckedPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

fn check_name(name: &str, violations: &mut Vec<Violation>) -> Option<String> {
    let name = name.trim();
    let message = if name.is_empty() {
        "Product name is required"
    } else if name.chars().count() < NAME_MIN_LEN {
        "Product name must be at least 2 characters"
    } else if name.chars().count() > NAME_MAX_LEN {
        "Product name cannot exceed 100 characters"
    } else {
        return Some(name.to_owned());
    };
    violations.push(Violation {
        field: "name".into(),
        message: message.into(),
    });
    None
}

fn check_description(description: &str, violations: &mut Vec<Violation>) -> Option<String> {
    let description = description.trim();
    let message = if description.is_empty() {
        "Description is required"
    } else if description.chars().count() > DESCRIPTION_MAX_LEN {
        "Description cannot exceed 500 characters"
    } else {
        return Some(description.to_owned());
    };
    violations.push(Violation {
        field: "description".into(),
        message: message.into(),
    });
    None
}

fn check_category(category: &str, violations: &mut Vec<Violation>) -> Option<Category> {
    let category = category.trim();
    if category.is_empty() {
        violations.push(Violation {
            field: "category".into(),
            message: "Category is required".into(),
        });
        return None;
    }
    match category.parse::<Category>() {
        Ok(category) => Some(category),
        Err(err) => {
            violations.push(Violation {
                field: "category".into(),
                message: err.to_string(),
            });
            None
        }
    }
}

fn check_quantity(quantity: i32, violations: &mut Vec<Violation>) -> Option<i32> {
    if quantity < 0 {
        violations.push(Violation {
            field: "quantity".into(),
            message: "Quantity cannot be negative".into(),
        });
        return None;
    }
    Some(quantity)
}

fn check_price(price: Decimal, violations: &mut Vec<Violation>) -> Option<Decimal> {
    if price < Decimal::ZERO {
        violations.push(Violation {
            field: "price".into(),
            message: "Price cannot be negative".into(),
        });
        return None;
    }
    Some(price)
}

fn check_threshold(threshold: i32, violations: &mut Vec<Violation>) -> Option<i32> {
    if threshold < 0 {
        violations.push(Violation {
            field: "lowStockThreshold".into(),
            message: "Low stock threshold cannot be negative".into(),
        });
        return None;
    }
    Some(threshold)
}

/// Blank SKUs count as absent; anything else is kept verbatim after trimming.
fn normalize_sku(sku: Option<&str>) -> Option<String> {
    sku.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub fn check_new_item(new_item: &NewItem) -> Result<CheckedNewItem, Vec<Violation>> {
    let mut violations = Vec::new();

    let name = check_name(&new_item.name, &mut violations);
    let description = check_description(&new_item.description, &mut violations);
    let category = check_category(&new_item.category, &mut violations);
    let quantity = check_quantity(
        new_item.quantity.unwrap_or(DEFAULT_QUANTITY),
        &mut violations,
    );
    let price = match new_item.price {
        Some(price) => check_price(price, &mut violations),
        None => {
            violations.push(Violation {
                field: "price".into(),
                message: "Price is required".into(),
            });
            None
        }
    };
    let low_stock_threshold = check_threshold(
        new_item
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        &mut violations,
    );

    match (name, description, category, quantity, price, low_stock_threshold) {
        (
            Some(name),
            Some(description),
            Some(category),
            Some(quantity),
            Some(price),
            Some(low_stock_threshold),
        ) => Ok(CheckedNewItem {
            name,
            description,
            category,
            quantity,
            price,
            sku: normalize_sku(new_item.sku.as_deref()),
            low_stock_threshold,
        }),
        _ => Err(violations),
    }
}

/// Validates only the fields the patch actually carries.
pub fn check_patch(patch: &ItemPatch) -> Result<CheckedPatch, Vec<Violation>> {
    let mut violations = Vec::new();
    let mut checked = CheckedPatch::default();

    if let Some(ref name) = patch.name {
        checked.name = check_name(name, &mut violations);
    }
    if let Some(ref description) = patch.description {
        checked.description = check_description(description, &mut violations);
    }
    if let Some(ref category) = patch.category {
        checked.category = check_category(category, &mut violations);
    }
    if let Some(quantity) = patch.quantity {
        checked.quantity = check_quantity(quantity, &mut violations);
    }
    if let Some(price) = patch.price {
        checked.price = check_price(price, &mut violations);
    }
    if let Some(threshold) = patch.low_stock_threshold {
        checked.low_stock_threshold = check_threshold(threshold, &mut violations);
    }
    checked.sku = normalize_sku(patch.sku.as_deref());

    if violations.is_empty() {
        Ok(checked)
    } else {
        Err(violations)
    }
}
