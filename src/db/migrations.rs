//! Database migrations module
//!
//! Code-based migrations for the SQLite record store. All migrations are
//! embedded directly in Rust code as SQL strings for single-binary
//! deployment.
//!
//! # Usage
//!
//! ```ignore
//! use blogwire::db::{pool::SqliteDatabase, migrations};
//!
//! let db = SqliteDatabase::new("data/blogwire.db").await?;
//! migrations::run_migrations(db.pool()).await?;
//! ```
//!
//! Back-reference lists are stored as JSON arrays of ids. There are no
//! foreign keys: cross-record consistency is owned by the services.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements, separated by `;`
    pub up: &'static str,
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                name TEXT NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                blogs TEXT NOT NULL DEFAULT '[]',
                comments TEXT NOT NULL DEFAULT '[]'
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
    },
    Migration {
        version: 2,
        name: "create_blogs",
        up: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id VARCHAR(36) PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                date VARCHAR(64) NOT NULL,
                user_id VARCHAR(36) NOT NULL,
                comments TEXT NOT NULL DEFAULT '[]'
            );
            CREATE INDEX IF NOT EXISTS idx_blogs_user_id ON blogs(user_id);
        "#,
    },
    Migration {
        version: 3,
        name: "create_comments",
        up: r#"
            CREATE TABLE IF NOT EXISTS comments (
                id VARCHAR(36) PRIMARY KEY,
                text TEXT NOT NULL,
                date VARCHAR(64) NOT NULL,
                user_id VARCHAR(36) NOT NULL,
                blog_id VARCHAR(36) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_user_id ON comments(user_id);
            CREATE INDEX IF NOT EXISTS idx_comments_blog_id ON comments(blog_id);
        "#,
    },
];

/// Run all pending migrations
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;
    Ok(())
}

/// Versions already recorded in `schema_migrations`
async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i32>> {
    sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")
}

/// Apply a single migration and record it, all-or-nothing
async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;

    for statement in split_sql_statements(migration.up) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split SQL into individual statements, skipping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

/// Check if a string contains only SQL comments
fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::SqliteDatabase;

    async fn memory_pool() -> SqlitePool {
        SqliteDatabase::new(":memory:")
            .await
            .expect("Failed to create test pool")
            .pool()
            .clone()
    }

    #[tokio::test]
    async fn test_run_migrations_is_idempotent() {
        let pool = memory_pool().await;

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, MIGRATIONS.len());

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_applied_versions_are_recorded() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");

        let versions = applied_versions(&pool).await.unwrap();
        let expected: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert_eq!(versions, expected);
    }

    #[tokio::test]
    async fn test_users_email_is_unique() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");

        let insert = "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)";
        sqlx::query(insert)
            .bind("u1")
            .bind("Ann")
            .bind("ann@x.com")
            .bind("hash")
            .execute(&pool)
            .await
            .expect("First insert should succeed");

        let duplicate = sqlx::query(insert)
            .bind("u2")
            .bind("Other Ann")
            .bind("ann@x.com")
            .bind("hash")
            .execute(&pool)
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_reference_lists_default_to_empty() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");

        sqlx::query(
            "INSERT INTO blogs (id, title, content, date, user_id) \
             VALUES ('b1', 'T', 'C', '2024-01-01', 'u1')",
        )
        .execute(&pool)
        .await
        .expect("Failed to insert blog");

        let comments: String = sqlx::query_scalar("SELECT comments FROM blogs WHERE id = 'b1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(comments, "[]");
    }

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (x INT);\n-- just a comment\n;\nCREATE INDEX i ON a(x)";
        let statements = split_sql_statements(sql);
        assert_eq!(statements, vec!["CREATE TABLE a (x INT)", "CREATE INDEX i ON a(x)"]);
    }

    #[test]
    fn test_is_comment_only() {
        assert!(is_comment_only("-- one\n  -- two"));
        assert!(!is_comment_only("-- one\nSELECT 1"));
    }

    #[test]
    fn test_truncate_sql() {
        let long = "x".repeat(150);
        assert_eq!(truncate_sql(&long).len(), 103);
        assert_eq!(truncate_sql("SELECT 1"), "SELECT 1");
    }
}
