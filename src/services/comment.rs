//! Comment service
//!
//! Adding a comment registers its id on both the blog and the commenting
//! user; deleting it removes the id from both before the record goes.

use super::validation::{require_non_blank, validate_date};
use super::{ensure_written, finish_transaction, ServiceError};
use crate::db::{DynRecordStore, StoreTransaction};
use crate::models::{Comment, CreateCommentInput};

/// Comment service for comment mutations and reads
pub struct CommentService {
    store: DynRecordStore,
}

impl CommentService {
    /// Create a new comment service over the given record store
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    /// Attach a new comment to a blog.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank text or an unparsable date
    /// - `NotFound` if the user or the blog does not exist
    pub async fn add(&self, input: CreateCommentInput) -> Result<Comment, ServiceError> {
        require_non_blank("text", &input.text)?;
        validate_date("date", &input.date)?;

        let mut tx = self.store.begin().await?;
        let outcome = add_comment(tx.as_mut(), input).await;
        let comment = finish_transaction(tx, outcome).await?;

        tracing::info!("Added comment {} to blog {}", comment.id, comment.blog);
        Ok(comment)
    }

    /// Delete a comment and detach it from its blog and its user.
    ///
    /// Fails with `NotFound` if the comment, its user or its blog is
    /// missing; nothing is changed in that case.
    pub async fn delete(&self, id: &str) -> Result<Comment, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = delete_comment(tx.as_mut(), id).await;
        let comment = finish_transaction(tx, outcome).await?;

        tracing::info!("Deleted comment {}", comment.id);
        Ok(comment)
    }

    /// All comments in insertion order
    pub async fn list(&self) -> Result<Vec<Comment>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.list_comments().await.map_err(ServiceError::from);
        finish_transaction(tx, outcome).await
    }

    /// Get a comment by id
    pub async fn get(&self, id: &str) -> Result<Comment, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.find_comment(id).await.map_err(ServiceError::from);
        finish_transaction(tx, outcome).await?.ok_or_else(|| comment_not_found(id))
    }
}

async fn add_comment(
    tx: &mut dyn StoreTransaction,
    input: CreateCommentInput,
) -> Result<Comment, ServiceError> {
    let mut user = tx
        .find_user(&input.user)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User '{}' does not exist", input.user)))?;
    let mut blog = tx
        .find_blog(&input.blog)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Blog '{}' does not exist", input.blog)))?;

    let comment = Comment::new(input.text, input.date, user.id.clone(), blog.id.clone());
    tx.insert_comment(&comment).await?;

    blog.link_comment(&comment.id);
    ensure_written(tx.update_blog(&blog).await?, "Blog")?;

    user.link_comment(&comment.id);
    ensure_written(tx.update_user(&user).await?, "User")?;

    Ok(comment)
}

async fn delete_comment(tx: &mut dyn StoreTransaction, id: &str) -> Result<Comment, ServiceError> {
    let comment = tx.find_comment(id).await?.ok_or_else(|| comment_not_found(id))?;

    let mut user = tx.find_user(&comment.user).await?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "User '{}' of comment '{}' does not exist",
            comment.user, comment.id
        ))
    })?;
    let mut blog = tx.find_blog(&comment.blog).await?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Blog '{}' of comment '{}' does not exist",
            comment.blog, comment.id
        ))
    })?;

    blog.unlink_comment(&comment.id);
    ensure_written(tx.update_blog(&blog).await?, "Blog")?;

    user.unlink_comment(&comment.id);
    ensure_written(tx.update_user(&user).await?, "User")?;

    ensure_written(tx.delete_comment(&comment.id).await?, "Comment")?;
    Ok(comment)
}

fn comment_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Comment '{}' does not exist", id))
}
