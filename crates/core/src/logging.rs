//! # Structured Logging
//!
//! `tracing` subscriber setup shared by shrinkit binaries: plain, pretty or
//! JSON output, filtered by `RUST_LOG` when set and by the configured level
//! otherwise.

use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, Environment};
use crate::errors::CoreError;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Include file and line number information
    pub include_location: bool,
    /// Environment filter (supports complex filters like "shrinkit_orm=debug,sqlx=warn")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: false,
            include_location: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            include_location: false,
            env_filter: None,
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            include_location: true,
            env_filter: None,
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Preset for the environment, at the configured level
    pub fn from_app_config(config: &AppConfig) -> Self {
        let preset = match config.environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::test(),
            Environment::Production => Self::production(),
        };
        preset.with_level(&config.log_level)
    }

    /// Set the log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directives used when `RUST_LOG` is not set
    pub fn filter_directives(&self) -> String {
        match &self.env_filter {
            Some(filter) => filter.clone(),
            // sqlx logs every statement at info
            None => format!("{},sqlx=warn", self.level),
        }
    }
}

/// Initialize structured logging for the process.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let directives = config.filter_directives();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .map_err(|e| CoreError::logging(format!("invalid filter '{}': {}", directives, e)))?;

    let layer = Layer::new()
        .with_writer(io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = if config.json_format {
        // JSON structured logging
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else if config.pretty_print {
        // Pretty text logging
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init()
    } else {
        // Plain text logging
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
    };
    result.map_err(|e| CoreError::logging(e.to_string()))?;

    tracing::debug!(
        target: "shrinkit::logging",
        "Structured logging initialized (level: {}, format: {})",
        config.level,
        if config.json_format { "JSON" } else { "text" }
    );

    Ok(())
}
