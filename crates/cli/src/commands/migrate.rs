use anyhow::{Context, Result};
use shrinkit_core::AppConfig;
use shrinkit_orm::{
    redact_url, MigrationConfig, MigrationManager, MigrationSource, MigrationStatusReport,
};

fn migration_config(config: &AppConfig) -> MigrationConfig {
    MigrationConfig {
        migrations_dir: config.migrations_dir.clone(),
        migrations_table: config.migrations_table.clone(),
    }
}

async fn connect(config: &AppConfig) -> Result<MigrationManager> {
    let database_url = config.require_database_url()?;
    let migration_config = migration_config(config);
    migration_config
        .validate()
        .context("Invalid migration configuration")?;
    MigrationManager::connect(database_url, &migration_config)
        .await
        .with_context(|| format!("Failed to open migrations on {}", redact_url(database_url)))
}

/// Scaffold a migration file; never connects to the database
pub fn create(config: &AppConfig, name: &str) -> Result<()> {
    let source = MigrationSource::from_dir(&config.migrations_dir);
    let path = source
        .create(name)
        .with_context(|| format!("Failed to create migration '{}'", name))?;

    println!("Created migration: {}", path.display());
    Ok(())
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let manager = connect(config).await?;

    let pending = manager.list_pending().await?;
    if pending.is_empty() {
        println!("No pending migrations");
        manager.store().close().await;
        return Ok(());
    }
    println!("Found {} pending migrations", pending.len());

    let outcome = manager
        .migrate_with(|version| println!("Applied migration: {}", version))
        .await;
    manager.store().close().await;

    let result = outcome.context("Migration run halted")?;
    tracing::info!(
        applied = result.applied_count(),
        elapsed_ms = result.execution_time_ms as u64,
        "migration run finished"
    );
    println!("All migrations completed");
    Ok(())
}

pub async fn rollback(config: &AppConfig, version: &str) -> Result<()> {
    let manager = connect(config).await?;

    let outcome = manager.rollback(version).await;
    manager.store().close().await;

    let outcome = outcome.with_context(|| format!("Failed to roll back migration {}", version))?;
    if outcome.ledger_entry_removed {
        println!("Rolled back migration: {}", outcome.version);
    } else {
        println!(
            "Rolled back migration: {} (it was not recorded as applied)",
            outcome.version
        );
    }
    Ok(())
}

pub async fn status(config: &AppConfig, json: bool) -> Result<()> {
    let manager = connect(config).await?;

    let report = manager.status().await;
    manager.store().close().await;
    let report = report.context("Failed to read migration status")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_status(&report));
    }
    Ok(())
}

/// Human-readable status listing
fn render_status(report: &MigrationStatusReport) -> String {
    let mut out = String::from("Migration Status:\n================\n");

    if !report.applied.is_empty() {
        out.push_str("\nApplied migrations:\n");
        for version in &report.applied {
            out.push_str(&format!("  ✓ {}\n", version));
        }
    }

    if !report.pending.is_empty() {
        out.push_str("\nPending migrations:\n");
        for version in &report.pending {
            out.push_str(&format!("  ○ {}\n", version));
        }
    }

    if report.is_empty() {
        out.push_str("No migrations found\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sqlite_config(dir: &TempDir) -> AppConfig {
        AppConfig::testing()
            .with_database_url(format!(
                "sqlite://{}?mode=rwc",
                dir.path().join("shrinkit.db").display()
            ))
            .with_migrations_dir(dir.path().join("migrations"))
    }

    #[test]
    fn test_render_status() {
        let report = MigrationStatusReport {
            applied: vec!["20240101_000000_init".to_string()],
            pending: vec!["20240102_000000_add_col".to_string()],
        };
        assert_eq!(
            render_status(&report),
            "Migration Status:\n================\n\
             \nApplied migrations:\n  ✓ 20240101_000000_init\n\
             \nPending migrations:\n  ○ 20240102_000000_add_col\n"
        );

        let empty = MigrationStatusReport {
            applied: Vec::new(),
            pending: Vec::new(),
        };
        assert!(render_status(&empty).ends_with("No migrations found\n"));
    }

    #[test]
    fn test_create_does_not_need_a_database() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::production().with_migrations_dir(dir.path().join("migrations"));

        create(&config, "add click counter").unwrap();
        let files: Vec<_> = fs::read_dir(dir.path().join("migrations"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("_add_click_counter.sql"));

        assert!(create(&config, "???").is_err());
    }

    #[tokio::test]
    async fn test_migrate_status_rollback_commands() {
        let dir = TempDir::new().unwrap();
        let config = sqlite_config(&dir);
        fs::create_dir_all(&config.migrations_dir).unwrap();
        fs::write(
            config.migrations_dir.join("20240101_000000_init.sql"),
            "-- Up migration\nCREATE TABLE t (id INTEGER PRIMARY KEY);\n-- Down migration\nDROP TABLE t;\n",
        )
        .unwrap();

        status(&config, false).await.unwrap();
        run(&config).await.unwrap();
        // Second run finds nothing to do
        run(&config).await.unwrap();
        status(&config, true).await.unwrap();
        rollback(&config, "20240101_000000_init").await.unwrap();

        assert!(rollback(&config, "20240101_000000_missing").await.is_err());
    }

    #[tokio::test]
    async fn test_bad_ledger_table_fails_before_connecting() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so connecting would fail
        let mut config = AppConfig::testing().with_database_url(format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("absent").join("shrinkit.db").display()
        ));
        config.migrations_table = "ledger; DROP TABLE urls".to_string();

        let err = status(&config, false).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid migration configuration");
        assert!(!dir.path().join("absent").exists());
    }

    #[tokio::test]
    async fn test_missing_database_url_fails() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::production().with_migrations_dir(dir.path());
        assert!(status(&config, false).await.is_err());
    }
}
