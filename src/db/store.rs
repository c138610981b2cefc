//! Record store abstraction
//!
//! The coordinator services never talk to a database directly. They receive
//! a `DynRecordStore` at construction and run every read and write through a
//! `StoreTransaction` obtained from it:
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! let user = tx.find_user(&id).await?;
//! tx.commit().await?;
//! ```
//!
//! A transaction that is dropped without `commit` is discarded by every
//! backend, but callers are expected to `rollback` explicitly on failure.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::repositories::{BlogRecords, CommentRecords, UserRecords};
use crate::config::DatabaseDriver;

/// Typed store failures that callers may want to react to.
///
/// Everything else is reported as an opaque `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field already holds the given value
    #[error("Duplicate value for unique field '{field}'")]
    Duplicate { field: &'static str },

    /// The transaction was already committed or rolled back
    #[error("Transaction already finished")]
    Finished,

    /// A stored back-reference list could not be decoded
    #[error("Corrupt reference list in {collection}.{field}: {message}")]
    CorruptList {
        collection: &'static str,
        field: &'static str,
        message: String,
    },
}

/// One unit of work against the record store.
///
/// Entity accessors come from the per-collection traits; writes become
/// visible to other transactions only after `commit`.
#[async_trait]
pub trait StoreTransaction: UserRecords + BlogRecords + CommentRecords {
    /// Make every write of this transaction durable
    async fn commit(&mut self) -> Result<()>;

    /// Discard every write of this transaction
    async fn rollback(&mut self) -> Result<()>;
}

/// Handle to a record store backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Backend kind, for logging
    fn driver(&self) -> DatabaseDriver;
}

/// Shared record store handle
pub type DynRecordStore = Arc<dyn RecordStore>;
