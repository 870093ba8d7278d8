//! Migration Manager - Applies, reverts and reports migration units
//!
//! The manager ties a [`Store`] to a [`MigrationSource`] and the [`Ledger`]
//! that records what has been applied. Every unit runs in its own
//! transaction together with its ledger write, so a unit is either applied
//! and recorded or neither.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use super::definitions::{
    validate_table_name, LedgerEntry, MigrationConfig, MigrationDirection, MigrationRunResult,
    MigrationStatusReport, MigrationUnit, RollbackOutcome, DEFAULT_MIGRATIONS_TABLE,
};
use super::ledger::Ledger;
use super::source::MigrationSource;
use crate::database::Store;
use crate::error::{MigrationError, MigrationResult};

/// Migration manager bound to one store and one source
#[derive(Debug, Clone)]
pub struct MigrationManager {
    store: Store,
    source: MigrationSource,
    ledger: Ledger,
}

impl MigrationManager {
    /// Create a manager using the default ledger table
    pub async fn new(store: Store, source: MigrationSource) -> MigrationResult<Self> {
        Self::with_table(store, source, DEFAULT_MIGRATIONS_TABLE).await
    }

    /// Create a manager recording applied units in `table`.
    ///
    /// The ledger table is created if absent before the manager is returned.
    pub async fn with_table(
        store: Store,
        source: MigrationSource,
        table: &str,
    ) -> MigrationResult<Self> {
        validate_table_name(table)?;

        let ledger = Ledger::new(table, store.backend());
        ledger.ensure(&store).await?;

        Ok(Self {
            store,
            source,
            ledger,
        })
    }

    /// Create a manager scanning the configured migrations directory
    pub async fn with_config(store: Store, config: &MigrationConfig) -> MigrationResult<Self> {
        config.validate()?;
        let source = MigrationSource::from_dir(&config.migrations_dir);
        Self::with_table(store, source, &config.migrations_table).await
    }

    /// Connect to `database_url` and build a manager from `config`
    pub async fn connect(database_url: &str, config: &MigrationConfig) -> MigrationResult<Self> {
        config.validate()?;
        let store = Store::connect(database_url).await?;
        Self::with_config(store, config).await
    }

    /// Get the store handle
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get the migration source
    pub fn source(&self) -> &MigrationSource {
        &self.source
    }

    /// Get the ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Versions recorded in the ledger, ascending
    pub async fn list_applied(&self) -> MigrationResult<Vec<String>> {
        Ok(self
            .ledger
            .entries(&self.store)
            .await?
            .into_iter()
            .map(|entry| entry.version)
            .collect())
    }

    /// Ledger rows with their application time, ascending by version
    pub async fn applied_entries(&self) -> MigrationResult<Vec<LedgerEntry>> {
        self.ledger.entries(&self.store).await
    }

    /// Discovered versions not yet recorded in the ledger, ascending
    pub async fn list_pending(&self) -> MigrationResult<Vec<String>> {
        let applied: HashSet<String> = self.list_applied().await?.into_iter().collect();
        Ok(self
            .source
            .versions()?
            .into_iter()
            .filter(|version| !applied.contains(version))
            .collect())
    }

    /// Applied and pending versions from one ledger read and one scan
    pub async fn status(&self) -> MigrationResult<MigrationStatusReport> {
        let applied = self.list_applied().await?;
        let applied_set: HashSet<&str> = applied.iter().map(String::as_str).collect();

        let pending = self
            .source
            .versions()?
            .into_iter()
            .filter(|version| !applied_set.contains(version.as_str()))
            .collect();

        Ok(MigrationStatusReport { applied, pending })
    }

    /// Apply every pending unit in version order, stopping at the first failure
    pub async fn migrate(&self) -> MigrationResult<MigrationRunResult> {
        self.migrate_with(|_| {}).await
    }

    /// Like [`migrate`](Self::migrate), calling `on_applied` after each commit
    pub async fn migrate_with<F>(&self, mut on_applied: F) -> MigrationResult<MigrationRunResult>
    where
        F: FnMut(&str),
    {
        let start_time = Instant::now();

        let units = self.source.discover()?;
        let applied: HashSet<String> = self.list_applied().await?.into_iter().collect();

        let (already_applied, pending): (Vec<_>, Vec<_>) = units
            .into_iter()
            .partition(|(version, _)| applied.contains(version));
        let skipped_count = already_applied.len();

        if pending.is_empty() {
            tracing::info!("no pending migrations");
            return Ok(MigrationRunResult {
                applied_migrations: Vec::new(),
                skipped_count,
                execution_time_ms: start_time.elapsed().as_millis(),
            });
        }

        tracing::info!(count = pending.len(), "applying pending migrations");

        let mut applied_migrations = Vec::with_capacity(pending.len());
        for (version, unit) in pending {
            self.apply(unit.as_ref()).await?;
            on_applied(&version);
            applied_migrations.push(version);
        }

        Ok(MigrationRunResult {
            applied_migrations,
            skipped_count,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Apply one unit by version.
    ///
    /// The ledger is not checked first; re-running an applied version fails
    /// inside its transaction and leaves everything as it was.
    pub async fn run_one(&self, version: &str) -> MigrationResult<()> {
        let unit = self.source.load(version)?;
        self.apply(unit.as_ref()).await
    }

    /// Reverse one unit by version and drop its ledger row
    pub async fn rollback(&self, version: &str) -> MigrationResult<RollbackOutcome> {
        let start_time = Instant::now();

        let unit = self.source.load(version)?;
        let ledger_entry_removed = self.revert(unit.as_ref()).await?;

        Ok(RollbackOutcome {
            version: version.to_string(),
            ledger_entry_removed,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Scaffold a new migration file in the source directory
    pub fn create(&self, name: &str) -> MigrationResult<PathBuf> {
        self.source.create(name)
    }

    /// Run `up` and record the version in one transaction
    async fn apply(&self, unit: &dyn MigrationUnit) -> MigrationResult<()> {
        let version = unit.version();
        tracing::info!(version = %version, "applying migration {}", unit.name());

        let mut transaction = self.store.begin().await?;

        let result = async {
            unit.up(&mut transaction)
                .await
                .map_err(|e| MigrationError::application(version, MigrationDirection::Up, e))?;
            self.ledger.record(&mut transaction, version).await
        }
        .await;

        match result {
            Ok(()) => {
                transaction.commit().await?;
                tracing::info!(version = %version, "applied migration");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    tracing::warn!(version = %version, "failed to roll back transaction: {}", rollback_err);
                }
                tracing::error!(version = %version, "migration failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run `down` and remove the ledger row in one transaction
    async fn revert(&self, unit: &dyn MigrationUnit) -> MigrationResult<bool> {
        let version = unit.version();
        tracing::info!(version = %version, "rolling back migration {}", unit.name());

        let mut transaction = self.store.begin().await?;

        let result = async {
            unit.down(&mut transaction)
                .await
                .map_err(|e| MigrationError::application(version, MigrationDirection::Down, e))?;
            self.ledger.remove(&mut transaction, version).await
        }
        .await;

        match result {
            Ok(removed) => {
                transaction.commit().await?;
                if removed {
                    tracing::info!(version = %version, "rolled back migration");
                } else {
                    tracing::warn!(version = %version, "rolled back migration that had no ledger entry");
                }
                Ok(removed)
            }
            Err(e) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    tracing::warn!(version = %version, "failed to roll back transaction: {}", rollback_err);
                }
                tracing::error!(version = %version, "rollback failed: {}", e);
                Err(e)
            }
        }
    }
}
