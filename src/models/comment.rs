//! Comment model

use serde::{Deserialize, Serialize};

use super::new_record_id;

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Opaque identifier
    pub id: String,
    pub text: String,
    pub date: String,
    /// Author user id
    pub user: String,
    /// Blog id the comment belongs to
    pub blog: String,
}

impl Comment {
    pub fn new(text: String, date: String, user: String, blog: String) -> Self {
        Self {
            id: new_record_id(),
            text,
            date,
            user,
            blog,
        }
    }
}

/// Input for `addCommentToBlog`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    /// Blog id
    pub blog: String,
    /// Author user id
    pub user: String,
    pub text: String,
    pub date: String,
}
