mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use commands::migrate;
use shrinkit_core::{
    init_logging, AppConfig, AppConfigTrait, ConfigOverrides, Environment, LoggingConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shrinkit-migrate")]
#[command(about = "Schema migrations for the shrinkit URL shortener")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Database URL (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Directory holding migration files (defaults to MIGRATIONS_DIR or ./migrations)
    #[arg(long, global = true)]
    migrations_dir: Option<PathBuf>,

    /// Environment: development, testing or production (defaults to ENVIRONMENT)
    #[arg(long = "env", global = true)]
    environment: Option<Environment>,

    /// Log level: error, warn, info, debug or trace (defaults to LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl GlobalArgs {
    fn overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            environment: self.environment,
            database_url: self.database_url,
            migrations_dir: self.migrations_dir,
            log_level: self.log_level,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new migration file
    Create {
        /// Migration name
        name: String,
    },

    /// Run all pending migrations
    Migrate,

    /// Roll back one migration
    Rollback {
        /// Version of the migration to roll back
        version: String,
    },

    /// Show applied and pending migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::from_env_with(cli.global.overrides())
        .context("Invalid configuration")?;
    init_logging(&LoggingConfig::from_app_config(&config))?;
    tracing::debug!(environment = %config.environment, "configuration loaded");
    for (field, source) in config.config_sources() {
        tracing::debug!(field = %field, source = %source, "configuration source");
    }

    match cli.command {
        Commands::Create { name } => {
            migrate::create(&config, &name)?;
        }
        Commands::Migrate => {
            migrate::run(&config).await?;
        }
        Commands::Rollback { version } => {
            migrate::rollback(&config, &version).await?;
        }
        Commands::Status { json } => {
            migrate::status(&config, json).await?;
        }
    }

    Ok(())
}
