//! Inventory item tracking: per-owner CRUD, filtered listings, and stock
//! statistics.

// === PUBLIC CONTRACT ===
// Other modules consume items through the contract model only.
pub mod contract;

pub use contract::model::{Category, InventoryStats, Item, ItemPatch, NewItem};

// === INTERNAL LAYERS ===
// Exposed for the server binary and integration tests.
pub mod api;
pub mod domain;
pub mod infra;

pub use api::rest::routes::routes;
pub use domain::query::ItemQuery;
pub use domain::service::Service;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::sea_orm_repo::SeaOrmItemsRepository;
