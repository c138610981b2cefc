//! Blog service
//!
//! Implements business logic for blogs:
//! - Create a blog and register it on its author
//! - Update title and content
//! - Delete a blog together with its comments, detaching it from its author
//!   and each comment from its commenter

use super::validation::{require_non_blank, validate_date};
use super::{ensure_written, finish_transaction, ServiceError};
use crate::db::{DynRecordStore, StoreTransaction};
use crate::models::{Blog, CreateBlogInput, UpdateBlogInput};

/// Blog service for blog mutations and reads
pub struct BlogService {
    store: DynRecordStore,
}

impl BlogService {
    /// Create a new blog service over the given record store
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    /// Create a blog and append its id to the author's `blogs` list.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank title or content, or an unparsable date
    /// - `NotFound` if the author does not exist
    pub async fn create(&self, input: CreateBlogInput) -> Result<Blog, ServiceError> {
        require_non_blank("title", &input.title)?;
        require_non_blank("content", &input.content)?;
        validate_date("date", &input.date)?;

        let mut tx = self.store.begin().await?;
        let outcome = create_blog(tx.as_mut(), input).await;
        let blog = finish_transaction(tx, outcome).await?;

        tracing::info!("Created blog {} for user {}", blog.id, blog.user);
        Ok(blog)
    }

    /// Replace title and content of a blog.
    ///
    /// Author, date and comments are left untouched.
    pub async fn update(&self, input: UpdateBlogInput) -> Result<Blog, ServiceError> {
        require_non_blank("title", &input.title)?;
        require_non_blank("content", &input.content)?;

        let mut tx = self.store.begin().await?;
        let outcome = update_blog(tx.as_mut(), input).await;
        let blog = finish_transaction(tx, outcome).await?;

        tracing::debug!("Updated blog {}", blog.id);
        Ok(blog)
    }

    /// Delete a blog.
    ///
    /// Every comment on the blog is deleted as well and removed from its
    /// commenter's `comments` list; the blog id is removed from its author's
    /// `blogs` list. Returns the blog as it was before deletion.
    pub async fn delete(&self, id: &str) -> Result<Blog, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = delete_blog(tx.as_mut(), id).await;
        let blog = finish_transaction(tx, outcome).await?;

        tracing::info!("Deleted blog {}", blog.id);
        Ok(blog)
    }

    /// All blogs in insertion order
    pub async fn list(&self) -> Result<Vec<Blog>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.list_blogs().await.map_err(ServiceError::from);
        finish_transaction(tx, outcome).await
    }

    /// Get a blog by id
    pub async fn get(&self, id: &str) -> Result<Blog, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.find_blog(id).await.map_err(ServiceError::from);
        finish_transaction(tx, outcome).await?.ok_or_else(|| blog_not_found(id))
    }
}

async fn create_blog(
    tx: &mut dyn StoreTransaction,
    input: CreateBlogInput,
) -> Result<Blog, ServiceError> {
    let mut author = tx
        .find_user(&input.user)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("User '{}' does not exist", input.user))
        })?;

    let blog = Blog::new(input.title, input.content, input.date, author.id.clone());
    tx.insert_blog(&blog).await?;

    author.link_blog(&blog.id);
    ensure_written(tx.update_user(&author).await?, "Author")?;

    Ok(blog)
}

async fn update_blog(
    tx: &mut dyn StoreTransaction,
    input: UpdateBlogInput,
) -> Result<Blog, ServiceError> {
    let mut blog = tx
        .find_blog(&input.id)
        .await?
        .ok_or_else(|| blog_not_found(&input.id))?;

    blog.title = input.title;
    blog.content = input.content;
    ensure_written(tx.update_blog(&blog).await?, "Blog")?;

    Ok(blog)
}

async fn delete_blog(tx: &mut dyn StoreTransaction, id: &str) -> Result<Blog, ServiceError> {
    let blog = tx.find_blog(id).await?.ok_or_else(|| blog_not_found(id))?;

    // Users are re-read for every comment: one user may own several of them,
    // and may also be the blog's author.
    for comment in tx.list_comments_for_blog(&blog.id).await? {
        if let Some(mut commenter) = tx.find_user(&comment.user).await? {
            if commenter.unlink_comment(&comment.id) {
                ensure_written(tx.update_user(&commenter).await?, "Commenter")?;
            }
        }
        tx.delete_comment(&comment.id).await?;
    }

    match tx.find_user(&blog.user).await? {
        Some(mut author) => {
            if author.unlink_blog(&blog.id) {
                ensure_written(tx.update_user(&author).await?, "Author")?;
            }
        }
        None => tracing::warn!("Blog {} references missing author {}", blog.id, blog.user),
    }

    ensure_written(tx.delete_blog(&blog.id).await?, "Blog")?;
    Ok(blog)
}

fn blog_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Blog '{}' does not exist", id))
}
