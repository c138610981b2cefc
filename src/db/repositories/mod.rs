//! Database repositories
//!
//! The entity access layer. Each collection gets a `*Records` trait with
//! find-all, find-by-id, create, update-by-id and delete-by-id, implemented
//! for every store transaction type. The SQLite implementations live next
//! to their traits; the in-memory ones live in `db::memory`.

pub mod blog;
pub mod comment;
pub mod user;

pub use blog::BlogRecords;
pub use comment::CommentRecords;
pub use user::UserRecords;

use anyhow::Result;

use super::store::StoreError;

/// Decode a JSON-encoded id list column
pub(crate) fn decode_id_list(
    raw: &str,
    collection: &'static str,
    field: &'static str,
) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        StoreError::CorruptList {
            collection,
            field,
            message: e.to_string(),
        }
        .into()
    })
}

/// Encode an id list for storage
pub(crate) fn encode_id_list(ids: &[String]) -> Result<String> {
    Ok(serde_json::to_string(ids)?)
}
