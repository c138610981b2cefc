//! Blog model

use serde::{Deserialize, Serialize};

use super::{link_id, new_record_id, unlink_id};

/// Blog entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Opaque identifier
    pub id: String,
    pub title: String,
    pub content: String,
    /// Publication date as supplied by the author (`YYYY-MM-DD` or RFC 3339)
    pub date: String,
    /// Author user id
    pub user: String,
    /// Ids of comments on this blog, oldest first
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Blog {
    pub fn new(title: String, content: String, date: String, user: String) -> Self {
        Self {
            id: new_record_id(),
            title,
            content,
            date,
            user,
            comments: Vec::new(),
        }
    }

    pub fn link_comment(&mut self, comment_id: &str) {
        link_id(&mut self.comments, comment_id);
    }

    pub fn unlink_comment(&mut self, comment_id: &str) -> bool {
        unlink_id(&mut self.comments, comment_id)
    }
}

/// Input for `addBlog`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogInput {
    pub title: String,
    pub content: String,
    pub date: String,
    /// Author user id
    pub user: String,
}

/// Input for `updateBlog`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBlogInput {
    pub id: String,
    pub title: String,
    pub content: String,
}
