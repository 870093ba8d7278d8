//! Error types for the migration engine
//!
//! Every failure surfaced by the engine is a [`MigrationError`]. Store errors
//! coming out of sqlx are classified on conversion so that callers can tell an
//! unreachable database apart from a unit that failed or a ledger conflict.

use thiserror::Error;

use crate::migrations::definitions::MigrationDirection;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The store could not be reached, at initialization or mid-operation
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// No loadable artifact exists for the referenced version
    #[error("Migration not found: {version}")]
    UnitNotFound { version: String },

    /// A unit's `up` or `down` procedure failed; its transaction was rolled back
    #[error("Migration {version} failed while running {direction}: {message}")]
    Application {
        version: String,
        direction: MigrationDirection,
        message: String,
    },

    /// The ledger already holds a row for this version
    #[error("Migration {version} is already recorded in the ledger")]
    DuplicateVersion { version: String },

    /// Malformed artifact, conflicting registration or unusable name
    #[error("Invalid migration: {0}")]
    InvalidUnit(String),

    /// Any other store error
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid engine or connection configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Filesystem error while scanning or authoring migrations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// Create a unit-not-found error
    pub fn unit_not_found(version: impl Into<String>) -> Self {
        Self::UnitNotFound {
            version: version.into(),
        }
    }

    /// Wrap a failure raised while running a unit procedure.
    ///
    /// Connectivity failures keep their classification so callers still see
    /// that the store went away rather than a broken unit.
    pub fn application(
        version: impl Into<String>,
        direction: MigrationDirection,
        cause: MigrationError,
    ) -> Self {
        match cause {
            MigrationError::Connectivity(_) => cause,
            other => Self::Application {
                version: version.into(),
                direction,
                message: other.to_string(),
            },
        }
    }

    /// Check if the error means the store is unreachable
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Check if the error is a ledger uniqueness violation
    pub fn is_duplicate_version(&self) -> bool {
        matches!(self, Self::DuplicateVersion { .. })
    }

    /// The migration version the error is about, when there is one
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::UnitNotFound { version }
            | Self::Application { version, .. }
            | Self::DuplicateVersion { version } => Some(version),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for MigrationError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            MigrationError::Connectivity(err.to_string())
        } else {
            MigrationError::Database(err.to_string())
        }
    }
}

/// Errors that mean the connection to the store is gone or never existed
pub(crate) fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Unique constraint violations reported by the driver
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
