//! # shrinkit-core
//!
//! Configuration, logging setup and the shared error type for shrinkit
//! binaries.

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{AppConfig, AppConfigTrait, ConfigError, ConfigOverrides, ConfigSource, Environment};
pub use errors::CoreError;
pub use logging::{init_logging, LoggingConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
