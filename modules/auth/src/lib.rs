//! Account registration, login, and bearer-token verification.

// === PUBLIC CONTRACT ===
// Other modules consume users through the contract model only.
pub mod contract;

pub use contract::model::{Credentials, NewUser, User};

// === INTERNAL LAYERS ===
// Exposed for the server binary and integration tests.
pub mod api;
pub mod domain;
pub mod infra;

pub use api::rest::extract::Identity;
pub use api::rest::routes::routes;
pub use domain::service::Service;
pub use domain::token::{TokenError, TokenService};
pub use infra::storage::migrations::Migrator;
pub use infra::storage::sea_orm_repo::SeaOrmUsersRepository;
