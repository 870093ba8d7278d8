//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the fundamental types used throughout the migration system: the
//! [`MigrationUnit`] trait every unit implements, ledger records, engine
//! configuration and the summaries returned by the manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Any, Transaction};
use std::fmt;
use std::path::PathBuf;

use crate::error::{MigrationError, MigrationResult};

pub use shrinkit_core::config::{DEFAULT_MIGRATIONS_DIR, DEFAULT_MIGRATIONS_TABLE};

/// A versioned schema change with forward and reverse procedures.
///
/// Both procedures receive the transaction the manager opened for the unit;
/// they must not commit or roll it back themselves.
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    /// Unique version, lexicographically ordered in application order
    fn version(&self) -> &str;

    /// Human-readable name, derived from the version slug by default
    fn name(&self) -> String {
        name_from_version(self.version())
    }

    /// Apply the forward change
    async fn up<'a>(&self, tx: &mut Transaction<'a, Any>) -> MigrationResult<()>;

    /// Reverse the change
    async fn down<'a>(&self, tx: &mut Transaction<'a, Any>) -> MigrationResult<()>;
}

/// A row of the migration ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Version of the applied unit
    pub version: String,
    /// When the applying transaction ran
    pub applied_at: DateTime<Utc>,
}

/// Configuration for the migration system
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Directory where migration files are stored
    pub migrations_dir: PathBuf,
    /// Table name for tracking migrations
    pub migrations_table: String,
}

impl MigrationConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> MigrationResult<()> {
        validate_table_name(&self.migrations_table)
    }
}

/// Check that a ledger table name is a plain SQL identifier
pub fn validate_table_name(table: &str) -> MigrationResult<()> {
    shrinkit_core::config::validate_table_name(table)
        .map_err(|e| MigrationError::Configuration(e.to_string()))
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            migrations_table: DEFAULT_MIGRATIONS_TABLE.to_string(),
        }
    }
}

/// Result of running migrations
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRunResult {
    /// Versions that were applied, in application order
    pub applied_migrations: Vec<String>,
    /// Number of units that were already applied before the run
    pub skipped_count: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

impl MigrationRunResult {
    /// Number of migrations that were applied
    pub fn applied_count(&self) -> usize {
        self.applied_migrations.len()
    }
}

/// Result of rolling back one migration
#[derive(Debug, Clone, Serialize)]
pub struct RollbackOutcome {
    /// Version whose `down` procedure ran
    pub version: String,
    /// Whether a ledger row existed and was removed
    pub ledger_entry_removed: bool,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Snapshot of applied and pending versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatusReport {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl MigrationStatusReport {
    /// True when neither the ledger nor the source knows any migration
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.pending.is_empty()
    }
}

/// Migration direction for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationDirection {
    /// Apply the migration (run UP statements)
    Up,
    /// Rollback the migration (run DOWN statements)
    Down,
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "up"),
            MigrationDirection::Down => write!(f, "down"),
        }
    }
}

/// Derive a readable name from a version (format: YYYYMMDD_HHMMSS_name or timestamp_name)
pub fn name_from_version(version: &str) -> String {
    let parts: Vec<&str> = version.split('_').collect();
    if parts.len() >= 3 && parts[0].len() == 8 && parts[1].len() == 6 {
        parts[2..].join(" ")
    } else if parts.len() >= 2 {
        parts[1..].join(" ")
    } else {
        version.to_string()
    }
}
