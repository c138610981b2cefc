//! Data models
//!
//! This module contains the records kept by the blogwire backend:
//! - `User`, `Blog` and `Comment` entities as stored in the record store
//! - Input types accepted by the coordinator services
//!
//! Back-reference lists (`User::blogs`, `User::comments`, `Blog::comments`)
//! are plain id lists. The store never maintains them; the services do.

mod blog;
mod comment;
mod user;

pub use blog::{Blog, CreateBlogInput, UpdateBlogInput};
pub use comment::{Comment, CreateCommentInput};
pub use user::{LoginInput, RegisterInput, User};

/// Generate a new opaque record id
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Append `id` to a back-reference list unless it is already present.
pub(crate) fn link_id(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}

/// Remove every occurrence of `id` from a back-reference list.
///
/// Returns `true` if anything was removed.
pub(crate) fn unlink_id(list: &mut Vec<String>, id: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != id);
    list.len() != before
}
