//! Migration System
//!
//! Versioned schema changes for the shrinkit store: unit discovery, the
//! ledger of applied versions, and transactional apply and rollback.

pub mod definitions;
pub mod ledger;
pub mod manager;
pub mod source;

pub use definitions::*;
pub use ledger::Ledger;
pub use manager::MigrationManager;
pub use source::{sanitize_name, split_sql_statements, MigrationSource, SqlMigration};
