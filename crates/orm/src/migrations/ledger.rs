//! Migration Ledger - Persistent record of applied versions
//!
//! One row per applied unit. Rows are inserted and deleted only inside the
//! transaction that runs the unit, so the ledger never disagrees with the
//! schema it describes.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Any, Row, Transaction};

use super::definitions::LedgerEntry;
use crate::database::{Backend, Store};
use crate::error::{is_unique_violation, MigrationError, MigrationResult};

/// Queries against the ledger table
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
    backend: Backend,
}

impl Ledger {
    /// Create a ledger over `table`; the name must already be validated
    pub fn new(table: impl Into<String>, backend: Backend) -> Self {
        Self {
            table: table.into(),
            backend,
        }
    }

    /// Name of the ledger table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table unless this store handle already did
    pub async fn ensure(&self, store: &Store) -> MigrationResult<()> {
        let mut bootstrapped = store.bootstrapped().lock().await;
        if bootstrapped.contains(&self.table) {
            tracing::debug!(table = %self.table, "ledger already bootstrapped");
            return Ok(());
        }

        sqlx::query(&self.create_table_sql())
            .execute(store.pool())
            .await
            .map_err(|e| match MigrationError::from(e) {
                MigrationError::Database(msg) => MigrationError::Database(format!(
                    "Failed to create migrations table {}: {}",
                    self.table, msg
                )),
                other => other,
            })?;

        bootstrapped.insert(self.table.clone());
        tracing::info!(table = %self.table, "migration ledger ready");
        Ok(())
    }

    /// Applied entries, ascending by version
    pub async fn entries(&self, store: &Store) -> MigrationResult<Vec<LedgerEntry>> {
        let rows = sqlx::query(&self.applied_sql())
            .fetch_all(store.pool())
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let version: String = row.try_get("version")?;
            let applied_at: String = row.try_get("applied_at")?;
            entries.push(LedgerEntry {
                applied_at: parse_applied_at(&applied_at)?,
                version,
            });
        }

        // Byte order, independent of the database collation
        entries.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(entries)
    }

    /// Record `version` as applied within the unit's transaction
    pub async fn record(&self, tx: &mut Transaction<'_, Any>, version: &str) -> MigrationResult<()> {
        sqlx::query(&self.record_sql())
            .bind(version.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    MigrationError::DuplicateVersion {
                        version: version.to_string(),
                    }
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Remove the row for `version`; returns whether one existed
    pub async fn remove(&self, tx: &mut Transaction<'_, Any>, version: &str) -> MigrationResult<bool> {
        let result = sqlx::query(&self.remove_sql())
            .bind(version.to_string())
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// SQL to create the migrations tracking table
    pub fn create_table_sql(&self) -> String {
        match self.backend {
            Backend::Postgres => format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    \
                    id SERIAL PRIMARY KEY,\n    \
                    version VARCHAR(255) UNIQUE NOT NULL,\n    \
                    applied_at TIMESTAMP NOT NULL DEFAULT (now() AT TIME ZONE 'utc')\n\
                )",
                self.table
            ),
            Backend::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {} (\n    \
                    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
                    version VARCHAR(255) UNIQUE NOT NULL,\n    \
                    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))\n\
                )",
                self.table
            ),
        }
    }

    /// SQL to get applied migrations
    pub fn applied_sql(&self) -> String {
        format!(
            "SELECT CAST(version AS TEXT) AS version, CAST(applied_at AS TEXT) AS applied_at \
             FROM {} ORDER BY version",
            self.table
        )
    }

    /// SQL to record a migration as applied
    pub fn record_sql(&self) -> String {
        format!("INSERT INTO {} (version) VALUES ($1)", self.table)
    }

    /// SQL to remove a migration record (for rollback)
    pub fn remove_sql(&self) -> String {
        format!("DELETE FROM {} WHERE version = $1", self.table)
    }
}

/// Parse the textual timestamp both backends return for `applied_at`
fn parse_applied_at(raw: &str) -> MigrationResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    // "YYYY-MM-DD HH:MM:SS" with an optional fraction
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| MigrationError::Database(format!("invalid applied_at value '{}': {}", raw, e)))
}
