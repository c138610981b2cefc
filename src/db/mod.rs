//! Database layer
//!
//! This module provides the record store for blogwire. It supports:
//! - SQLite (default, through sqlx)
//! - an in-process memory store (development and tests)
//!
//! The backend is selected based on configuration and handed to the
//! services as a `DynRecordStore`.
//!
//! # Usage
//!
//! ```ignore
//! use blogwire::config::DatabaseConfig;
//! use blogwire::db::create_store;
//!
//! let store = create_store(&DatabaseConfig::default()).await?;
//! store.ping().await?;
//! let mut tx = store.begin().await?;
//! ```

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod sqlite;
pub mod store;

use anyhow::Result;

use crate::config::{DatabaseConfig, DatabaseDriver};

pub use memory::MemoryRecordStore;
pub use repositories::{BlogRecords, CommentRecords, UserRecords};
pub use sqlite::SqliteRecordStore;
pub use store::{DynRecordStore, RecordStore, StoreError, StoreTransaction};

/// Create a record store based on configuration.
///
/// For SQLite this connects and runs pending migrations.
pub async fn create_store(config: &DatabaseConfig) -> Result<DynRecordStore> {
    match config.driver {
        DatabaseDriver::Sqlite => Ok(SqliteRecordStore::connect(&config.url).await?.boxed()),
        DatabaseDriver::Memory => Ok(MemoryRecordStore::new().boxed()),
    }
}

/// Create an in-memory SQLite store for testing
pub async fn create_test_store() -> Result<DynRecordStore> {
    let config = DatabaseConfig {
        driver: DatabaseDriver::Sqlite,
        url: ":memory:".to_string(),
    };
    create_store(&config).await
}
