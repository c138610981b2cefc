//! In-memory record store
//!
//! A process-local backend for development and tests. Transactions are
//! serialized: `begin` waits for an async mutex that stays locked until the
//! transaction commits, rolls back or is dropped. Writes go to a private
//! working copy that replaces the shared state only on commit.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::repositories::{BlogRecords, CommentRecords, UserRecords};
use super::store::{DynRecordStore, RecordStore, StoreError, StoreTransaction};
use crate::config::DatabaseDriver;
use crate::models::{Blog, Comment, User};

/// The three collections, in insertion order
#[derive(Debug, Clone, Default)]
struct Collections {
    users: Vec<User>,
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
}

/// Record store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    state: Arc<Mutex<Collections>>,
    /// Fail the write after this many successful writes per transaction
    write_budget: Option<usize>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle for dependency injection
    pub fn boxed(self) -> DynRecordStore {
        Arc::new(self)
    }

    /// A handle to the same data whose transactions fail on the write
    /// following `writes` successful ones. Used to exercise rollback paths.
    pub fn failing_after(&self, writes: usize) -> Self {
        Self {
            state: self.state.clone(),
            write_budget: Some(writes),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            working,
            write_budget: self.write_budget,
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Memory
    }
}

/// An open in-memory transaction
pub struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<Collections>>,
    working: Collections,
    write_budget: Option<usize>,
}

impl MemoryTransaction {
    fn data(&mut self) -> Result<&mut Collections> {
        if self.guard.is_none() {
            return Err(StoreError::Finished.into());
        }
        Ok(&mut self.working)
    }

    /// Collections for a write, charging the write budget
    fn data_for_write(&mut self) -> Result<&mut Collections> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                anyhow::bail!("Injected write failure");
            }
            *budget -= 1;
        }
        self.data()
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn commit(&mut self) -> Result<()> {
        let mut guard = self.guard.take().ok_or(StoreError::Finished)?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.guard.take().ok_or(StoreError::Finished)?;
        self.working = Collections::default();
        Ok(())
    }
}

#[async_trait]
impl UserRecords for MemoryTransaction {
    async fn list_users(&mut self) -> Result<Vec<User>> {
        Ok(self.data()?.users.clone())
    }

    async fn find_user(&mut self, id: &str) -> Result<Option<User>> {
        Ok(self.data()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self.data()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<()> {
        let data = self.data_for_write()?;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate { field: "email" }.into());
        }
        if data.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Duplicate { field: "id" }.into());
        }
        data.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<bool> {
        let data = self.data_for_write()?;
        if data.users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(StoreError::Duplicate { field: "email" }.into());
        }
        Ok(replace_by_id(&mut data.users, user, |u| &u.id))
    }

    async fn delete_user(&mut self, id: &str) -> Result<bool> {
        let data = self.data_for_write()?;
        Ok(remove_by_id(&mut data.users, id, |u| &u.id))
    }
}

#[async_trait]
impl BlogRecords for MemoryTransaction {
    async fn list_blogs(&mut self) -> Result<Vec<Blog>> {
        Ok(self.data()?.blogs.clone())
    }

    async fn find_blog(&mut self, id: &str) -> Result<Option<Blog>> {
        Ok(self.data()?.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_blog(&mut self, blog: &Blog) -> Result<()> {
        let data = self.data_for_write()?;
        if data.blogs.iter().any(|b| b.id == blog.id) {
            return Err(StoreError::Duplicate { field: "id" }.into());
        }
        data.blogs.push(blog.clone());
        Ok(())
    }

    async fn update_blog(&mut self, blog: &Blog) -> Result<bool> {
        let data = self.data_for_write()?;
        Ok(replace_by_id(&mut data.blogs, blog, |b| &b.id))
    }

    async fn delete_blog(&mut self, id: &str) -> Result<bool> {
        let data = self.data_for_write()?;
        Ok(remove_by_id(&mut data.blogs, id, |b| &b.id))
    }
}

#[async_trait]
impl CommentRecords for MemoryTransaction {
    async fn list_comments(&mut self) -> Result<Vec<Comment>> {
        Ok(self.data()?.comments.clone())
    }

    async fn find_comment(&mut self, id: &str) -> Result<Option<Comment>> {
        Ok(self.data()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments_for_blog(&mut self, blog_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .data()?
            .comments
            .iter()
            .filter(|c| c.blog == blog_id)
            .cloned()
            .collect())
    }

    async fn insert_comment(&mut self, comment: &Comment) -> Result<()> {
        let data = self.data_for_write()?;
        if data.comments.iter().any(|c| c.id == comment.id) {
            return Err(StoreError::Duplicate { field: "id" }.into());
        }
        data.comments.push(comment.clone());
        Ok(())
    }

    async fn update_comment(&mut self, comment: &Comment) -> Result<bool> {
        let data = self.data_for_write()?;
        Ok(replace_by_id(&mut data.comments, comment, |c| &c.id))
    }

    async fn delete_comment(&mut self, id: &str) -> Result<bool> {
        let data = self.data_for_write()?;
        Ok(remove_by_id(&mut data.comments, id, |c| &c.id))
    }
}

fn replace_by_id<T: Clone>(items: &mut [T], item: &T, id_of: impl Fn(&T) -> &String) -> bool {
    let id = id_of(item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => {
            *slot = item.clone();
            true
        }
        None => false,
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &String) -> bool {
    let before = items.len();
    items.retain(|existing| id_of(existing) != id);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> User {
        User::new("Ann".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_commit_publishes_working_copy() {
        let store = MemoryRecordStore::new();
        let user = sample_user("ann@x.com");

        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&user).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.list_users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn test_rollback_and_drop_discard_writes() {
        let store = MemoryRecordStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&sample_user("a@x.com")).await.unwrap();
        tx.rollback().await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(&sample_user("b@x.com")).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&sample_user("ann@x.com")).await.unwrap();

        let err = tx.insert_user(&sample_user("ann@x.com")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Duplicate { field: "email" })
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        let blog = Blog::new("T".into(), "C".into(), "2024-01-01".into(), "u1".into());
        tx.insert_blog(&blog).await.unwrap();

        let mut edited = blog.clone();
        edited.title = "T2".to_string();
        assert!(tx.update_blog(&edited).await.unwrap());
        assert_eq!(tx.find_blog(&blog.id).await.unwrap().unwrap().title, "T2");

        assert!(tx.delete_blog(&blog.id).await.unwrap());
        assert!(!tx.delete_blog(&blog.id).await.unwrap());
        assert!(!tx.update_blog(&edited).await.unwrap());
    }

    #[tokio::test]
    async fn test_transactions_are_serialized() {
        let store = MemoryRecordStore::new();
        let wait = std::time::Duration::from_millis(50);
        let first = store.begin().await.unwrap();

        let pending = tokio::time::timeout(wait, store.begin()).await;
        assert!(pending.is_err(), "second transaction should wait for the first");

        drop(first);
        let second = tokio::time::timeout(wait, store.begin()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_failing_after_injects_write_error() {
        let store = MemoryRecordStore::new();
        let faulty = store.failing_after(1);

        let mut tx = faulty.begin().await.unwrap();
        tx.insert_user(&sample_user("a@x.com")).await.unwrap();
        assert!(tx.insert_user(&sample_user("b@x.com")).await.is_err());
        // Reads are not charged
        assert_eq!(tx.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_finished_transaction_rejects_use() {
        let store = MemoryRecordStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.commit().await.unwrap();

        let err = tx.find_user("x").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Finished)));
    }
}
