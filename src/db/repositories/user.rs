//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRecords` trait defining the interface for user data access
//! - its implementation for `SqliteTransaction`

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{decode_id_list, encode_id_list};
use crate::db::sqlite::SqliteTransaction;
use crate::db::store::StoreError;
use crate::models::User;

/// User data access
#[async_trait]
pub trait UserRecords: Send {
    /// All users in insertion order
    async fn list_users(&mut self) -> Result<Vec<User>>;

    /// Get user by ID
    async fn find_user(&mut self, id: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Create a new user
    ///
    /// Fails with `StoreError::Duplicate` if the email is taken.
    async fn insert_user(&mut self, user: &User) -> Result<()>;

    /// Replace every field of the user with the same id.
    ///
    /// Returns `false` if no such user exists.
    async fn update_user(&mut self, user: &User) -> Result<bool>;

    /// Delete a user. Returns `false` if no such user exists.
    async fn delete_user(&mut self, id: &str) -> Result<bool>;
}

#[async_trait]
impl UserRecords for SqliteTransaction {
    async fn list_users(&mut self) -> Result<Vec<User>> {
        list_users_sqlite(self.conn()?).await
    }

    async fn find_user(&mut self, id: &str) -> Result<Option<User>> {
        find_user_sqlite(self.conn()?, id).await
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        find_user_by_email_sqlite(self.conn()?, email).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<()> {
        insert_user_sqlite(self.conn()?, user).await
    }

    async fn update_user(&mut self, user: &User) -> Result<bool> {
        update_user_sqlite(self.conn()?, user).await
    }

    async fn delete_user(&mut self, id: &str) -> Result<bool> {
        delete_user_sqlite(self.conn()?, id).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_users_sqlite(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, email, password, blogs, comments
        FROM users
        ORDER BY rowid
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .context("Failed to list users")?;

    rows.iter().map(row_to_user).collect()
}

async fn find_user_sqlite(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password, blogs, comments
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user).transpose()
}

async fn find_user_by_email_sqlite(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password, blogs, comments
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await
    .context("Failed to get user by email")?;

    row.as_ref().map(row_to_user).transpose()
}

async fn insert_user_sqlite(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password, blogs, comments)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(encode_id_list(&user.blogs)?)
    .bind(encode_id_list(&user.comments)?)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let field = if e.message().contains("email") { "email" } else { "id" };
            Err(StoreError::Duplicate { field }.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to create user")),
    }
}

async fn update_user_sqlite(conn: &mut SqliteConnection, user: &User) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, password = ?, blogs = ?, comments = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(encode_id_list(&user.blogs)?)
    .bind(encode_id_list(&user.comments)?)
    .bind(&user.id)
    .execute(&mut *conn)
    .await
    .context("Failed to update user")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_user_sqlite(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let blogs: String = row.try_get("blogs")?;
    let comments: String = row.try_get("comments")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        blogs: decode_id_list(&blogs, "users", "blogs")?,
        comments: decode_id_list(&comments, "users", "comments")?,
    })
}
