//! Runtime support for the Stockroom server: layered configuration and
//! logging/tracing initialization shared by the binary and tests.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, AuthConfig, CliArgs, DatabaseConfig, LoggingConfig, ServerConfig};
pub use logging::{init_default_logging, init_logging_from_config};
