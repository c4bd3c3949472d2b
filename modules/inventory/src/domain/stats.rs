use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::contract::model::{InventoryStats, Item};

/// Folds a snapshot of items into aggregate numbers in one pass.
///
/// `total_value` is exact decimal arithmetic over `price * quantity`.
/// Categories with no items do not appear in `category_counts`.
pub fn summarize(items: &[Item]) -> InventoryStats {
    let mut total_value = Decimal::ZERO;
    let mut low_stock_items = 0;
    let mut out_of_stock_items = 0;
    let mut category_counts = BTreeMap::new();

    for item in items {
        total_value += item.price * Decimal::from(item.quantity);
        if item.is_low_stock() {
            low_stock_items += 1;
        }
        if item.quantity == 0 {
            out_of_stock_items += 1;
        }
        *category_counts.entry(item.category).or_insert(0) += 1;
    }

    InventoryStats {
        total_items: items.len() as u64,
        total_value,
        low_stock_items,
        out_of_stock_items,
        category_counts,
    }
}
