//! Blog repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{decode_id_list, encode_id_list};
use crate::db::sqlite::SqliteTransaction;
use crate::models::Blog;

/// Blog data access
#[async_trait]
pub trait BlogRecords: Send {
    /// All blogs in insertion order
    async fn list_blogs(&mut self) -> Result<Vec<Blog>>;

    /// Get blog by ID
    async fn find_blog(&mut self, id: &str) -> Result<Option<Blog>>;

    /// Create a new blog
    async fn insert_blog(&mut self, blog: &Blog) -> Result<()>;

    /// Replace every field of the blog with the same id.
    ///
    /// Returns `false` if no such blog exists.
    async fn update_blog(&mut self, blog: &Blog) -> Result<bool>;

    /// Delete a blog. Returns `false` if no such blog exists.
    async fn delete_blog(&mut self, id: &str) -> Result<bool>;
}

#[async_trait]
impl BlogRecords for SqliteTransaction {
    async fn list_blogs(&mut self) -> Result<Vec<Blog>> {
        let rows = sqlx::query(
            "SELECT id, title, content, date, user_id, comments FROM blogs ORDER BY rowid",
        )
        .fetch_all(self.conn()?)
        .await
        .context("Failed to list blogs")?;

        rows.iter().map(row_to_blog).collect()
    }

    async fn find_blog(&mut self, id: &str) -> Result<Option<Blog>> {
        let row = sqlx::query(
            "SELECT id, title, content, date, user_id, comments FROM blogs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await
        .context("Failed to get blog by ID")?;

        row.as_ref().map(row_to_blog).transpose()
    }

    async fn insert_blog(&mut self, blog: &Blog) -> Result<()> {
        insert_blog_sqlite(self.conn()?, blog).await
    }

    async fn update_blog(&mut self, blog: &Blog) -> Result<bool> {
        update_blog_sqlite(self.conn()?, blog).await
    }

    async fn delete_blog(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(self.conn()?)
            .await
            .context("Failed to delete blog")?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_blog_sqlite(conn: &mut SqliteConnection, blog: &Blog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, content, date, user_id, comments)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.id)
    .bind(&blog.title)
    .bind(&blog.content)
    .bind(&blog.date)
    .bind(&blog.user)
    .bind(encode_id_list(&blog.comments)?)
    .execute(&mut *conn)
    .await
    .context("Failed to create blog")?;

    Ok(())
}

async fn update_blog_sqlite(conn: &mut SqliteConnection, blog: &Blog) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE blogs
        SET title = ?, content = ?, date = ?, user_id = ?, comments = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.title)
    .bind(&blog.content)
    .bind(&blog.date)
    .bind(&blog.user)
    .bind(encode_id_list(&blog.comments)?)
    .bind(&blog.id)
    .execute(&mut *conn)
    .await
    .context("Failed to update blog")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_blog(row: &SqliteRow) -> Result<Blog> {
    let comments: String = row.try_get("comments")?;

    Ok(Blog {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        date: row.try_get("date")?,
        user: row.try_get("user_id")?,
        comments: decode_id_list(&comments, "blogs", "comments")?,
    })
}
