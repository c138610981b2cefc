//! Services layer - Business logic
//!
//! The coordinator services own every mutation of the record store. Each
//! operation runs inside one store transaction and keeps the denormalized
//! back-reference lists in step with the records they point at:
//! - `UserService` - signup and login
//! - `BlogService` - create, update and delete blogs
//! - `CommentService` - attach comments to blogs and remove them
//!
//! An operation either commits all of its writes or rolls back all of them.

pub mod blog;
pub mod comment;
pub mod password;
pub mod user;
pub mod validation;

use crate::db::StoreTransaction;

pub use blog::BlogService;
pub use comment::CommentService;
pub use password::{hash_password, verify_password};
pub use user::UserService;

/// Error types shared by the coordinator services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A unique field is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials did not match
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Required field blank or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store or hashing failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Commit `tx` if `outcome` succeeded, otherwise roll it back.
///
/// The outcome's error wins over a failed rollback; the rollback failure is
/// only logged.
pub(crate) async fn finish_transaction<T>(
    mut tx: Box<dyn StoreTransaction>,
    outcome: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(e) = tx.rollback().await {
                tracing::warn!("Failed to roll back transaction: {:#}", e);
            }
            Err(err)
        }
    }
}

/// Fail with an internal error if a write matched no record.
///
/// Used where the record was read earlier in the same transaction, so a
/// miss means the store is misbehaving.
pub(crate) fn ensure_written(written: bool, what: &str) -> Result<(), ServiceError> {
    if written {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} disappeared during the transaction", what).into())
    }
}
