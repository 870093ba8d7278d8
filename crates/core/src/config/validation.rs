use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Log levels accepted by `LOG_LEVEL`
pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Validate a log level name
pub fn validate_log_level(level: &str) -> Result<(), ConfigError> {
    if VALID_LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            "log_level",
            level,
            format!("one of: {}", VALID_LOG_LEVELS.join(", ")),
        ))
    }
}

/// Check that a ledger table name is a plain SQL identifier.
///
/// The name is interpolated into ledger statements, so anything beyond
/// `[A-Za-z_][A-Za-z0-9_]*` (at most 63 characters) is rejected.
pub fn validate_table_name(table: &str) -> Result<(), ConfigError> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let ident = IDENT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("identifier pattern is valid")
    });

    if ident.is_match(table) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            "migrations_table",
            table,
            "a SQL identifier of letters, digits and underscores",
        ))
    }
}
