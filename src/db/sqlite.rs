//! SQLite record store
//!
//! Wraps an sqlx pool; every `StoreTransaction` handed out owns one sqlx
//! transaction. Entity SQL lives in `db::repositories`.
//!
//! Transactions are serialized by an async mutex held from `begin` until
//! commit, rollback or drop. sqlx opens deferred transactions, and SQLite
//! answers a read-then-write overlap with SQLITE_BUSY instead of waiting.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::migrations;
use super::pool::SqliteDatabase;
use super::store::{DynRecordStore, RecordStore, StoreError, StoreTransaction};
use crate::config::DatabaseDriver;

/// Record store backed by SQLite
pub struct SqliteRecordStore {
    db: SqliteDatabase,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteRecordStore {
    /// Connect to the database and bring its schema up to date
    pub async fn connect(url: &str) -> Result<Self> {
        let db = SqliteDatabase::new(url).await?;
        migrations::run_migrations(db.pool())
            .await
            .context("Failed to run migrations")?;
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a shared handle for dependency injection
    pub fn boxed(self) -> DynRecordStore {
        Arc::new(self)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.write_lock.clone().lock_owned().await;
        let tx = self
            .db
            .pool()
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(Box::new(SqliteTransaction {
            inner: Some(tx),
            lock: Some(guard),
        }))
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Sqlite
    }
}

/// An open SQLite transaction
///
/// Field order matters: on drop the sqlx transaction is rolled back before
/// the lock is released.
pub struct SqliteTransaction {
    inner: Option<Transaction<'static, Sqlite>>,
    lock: Option<OwnedMutexGuard<()>>,
}

impl SqliteTransaction {
    /// Connection of the still-open transaction
    pub(crate) fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.inner
            .as_deref_mut()
            .ok_or_else(|| StoreError::Finished.into())
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn commit(&mut self) -> Result<()> {
        let tx = self.inner.take().ok_or(StoreError::Finished)?;
        let result = tx.commit().await.context("Failed to commit transaction");
        self.lock.take();
        result
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self.inner.take().ok_or(StoreError::Finished)?;
        let result = tx.rollback().await.context("Failed to roll back transaction");
        self.lock.take();
        result
    }
}
