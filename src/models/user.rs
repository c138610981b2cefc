//! User model
//!
//! A registered author. `email` is unique across the store and `password`
//! always holds an Argon2 hash, never plaintext.

use serde::{Deserialize, Serialize};

use super::{link_id, new_record_id, unlink_id};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    /// Ids of blogs written by this user, oldest first
    #[serde(default)]
    pub blogs: Vec<String>,
    /// Ids of comments written by this user, oldest first
    #[serde(default)]
    pub comments: Vec<String>,
}

impl User {
    /// Create a new user with empty back-reference lists.
    ///
    /// The password must already be hashed, see
    /// `services::password::hash_password()`.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: new_record_id(),
            name,
            email,
            password: password_hash,
            blogs: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn link_blog(&mut self, blog_id: &str) {
        link_id(&mut self.blogs, blog_id);
    }

    pub fn unlink_blog(&mut self, blog_id: &str) -> bool {
        unlink_id(&mut self.blogs, blog_id)
    }

    pub fn link_comment(&mut self, comment_id: &str) {
        link_id(&mut self.comments, comment_id);
    }

    pub fn unlink_comment(&mut self, comment_id: &str) -> bool {
        unlink_id(&mut self.comments, comment_id)
    }
}

/// Input for `signup`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Input for `login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_has_empty_lists() {
        let user = User::new("Ann".into(), "ann@x.com".into(), "hash".into());
        assert!(!user.id.is_empty());
        assert!(user.blogs.is_empty());
        assert!(user.comments.is_empty());
    }

    #[test]
    fn test_user_serialization_omits_password() {
        let user = User::new("Ann".into(), "ann@x.com".into(), "$argon2id$secret".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ann@x.com");
        assert_eq!(json["blogs"], serde_json::json!([]));
    }

    #[test]
    fn test_link_and_unlink_blog() {
        let mut user = User::new("Ann".into(), "ann@x.com".into(), "hash".into());
        user.link_blog("b1");
        user.link_blog("b1");
        user.link_blog("b2");
        assert_eq!(user.blogs, vec!["b1", "b2"]);
        assert!(user.unlink_blog("b1"));
        assert_eq!(user.blogs, vec!["b2"]);
    }
}
