//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::sqlite::SqliteTransaction;
use crate::models::Comment;

/// Comment data access
#[async_trait]
pub trait CommentRecords: Send {
    /// All comments in insertion order
    async fn list_comments(&mut self) -> Result<Vec<Comment>>;

    /// Get comment by ID
    async fn find_comment(&mut self, id: &str) -> Result<Option<Comment>>;

    /// Comments attached to a blog, in insertion order
    async fn list_comments_for_blog(&mut self, blog_id: &str) -> Result<Vec<Comment>>;

    /// Create a new comment
    async fn insert_comment(&mut self, comment: &Comment) -> Result<()>;

    /// Replace every field of the comment with the same id.
    ///
    /// Returns `false` if no such comment exists.
    async fn update_comment(&mut self, comment: &Comment) -> Result<bool>;

    /// Delete a comment. Returns `false` if no such comment exists.
    async fn delete_comment(&mut self, id: &str) -> Result<bool>;
}

#[async_trait]
impl CommentRecords for SqliteTransaction {
    async fn list_comments(&mut self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, text, date, user_id, blog_id FROM comments ORDER BY rowid",
        )
        .fetch_all(self.conn()?)
        .await
        .context("Failed to list comments")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn find_comment(&mut self, id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, text, date, user_id, blog_id FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await
        .context("Failed to get comment by ID")?;

        row.as_ref().map(row_to_comment).transpose()
    }

    async fn list_comments_for_blog(&mut self, blog_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, date, user_id, blog_id
            FROM comments
            WHERE blog_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(blog_id)
        .fetch_all(self.conn()?)
        .await
        .context("Failed to list comments by blog")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn insert_comment(&mut self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, text, date, user_id, blog_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.text)
        .bind(&comment.date)
        .bind(&comment.user)
        .bind(&comment.blog)
        .execute(self.conn()?)
        .await
        .context("Failed to create comment")?;

        Ok(())
    }

    async fn update_comment(&mut self, comment: &Comment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET text = ?, date = ?, user_id = ?, blog_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&comment.text)
        .bind(&comment.date)
        .bind(&comment.user)
        .bind(&comment.blog)
        .bind(&comment.id)
        .execute(self.conn()?)
        .await
        .context("Failed to update comment")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_comment(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.conn()?)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_comment(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        date: row.try_get("date")?,
        user: row.try_get("user_id")?,
        blog: row.try_get("blog_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::SqliteRecordStore;
    use crate::db::store::{RecordStore, StoreTransaction};

    async fn open_tx() -> (SqliteRecordStore, Box<dyn StoreTransaction>) {
        let store = SqliteRecordStore::connect(":memory:")
            .await
            .expect("Failed to create test store");
        let tx = store.begin().await.expect("Failed to begin");
        (store, tx)
    }

    fn sample_comment() -> Comment {
        Comment::new(
            "nice!".to_string(),
            "2024-01-02".to_string(),
            "user-1".to_string(),
            "blog-1".to_string(),
        )
    }

    #[tokio::test]
    async fn test_comment_crud() {
        let (_store, mut tx) = open_tx().await;
        let mut comment = sample_comment();

        tx.insert_comment(&comment).await.expect("Failed to insert");
        assert_eq!(tx.find_comment(&comment.id).await.unwrap(), Some(comment.clone()));

        comment.text = "edited".to_string();
        assert!(tx.update_comment(&comment).await.unwrap());
        assert_eq!(tx.list_comments().await.unwrap(), vec![comment.clone()]);

        assert!(tx.delete_comment(&comment.id).await.unwrap());
        assert!(tx.find_comment(&comment.id).await.unwrap().is_none());
        assert!(!tx.delete_comment(&comment.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_comments_for_blog() {
        let (_store, mut tx) = open_tx().await;
        let first = sample_comment();
        let other = Comment::new("x".into(), "2024-01-03".into(), "user-1".into(), "blog-2".into());
        let second = sample_comment();
        for comment in [&first, &other, &second] {
            tx.insert_comment(comment).await.unwrap();
        }

        let found = tx.list_comments_for_blog("blog-1").await.unwrap();
        assert_eq!(found, vec![first, second]);
        assert!(tx.list_comments_for_blog("blog-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_comment() {
        let (_store, mut tx) = open_tx().await;
        assert!(!tx.update_comment(&sample_comment()).await.unwrap());
    }
}
