pub mod error;
pub mod query;
pub mod repo;
pub mod service;
pub mod stats;
pub mod validate;
