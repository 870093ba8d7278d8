use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for shrinkit services
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },
}

impl CoreError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new logging error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Check if the error came from configuration loading or validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Configuration { .. })
    }
}
