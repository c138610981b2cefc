//! User service
//!
//! Implements business logic for user accounts:
//! - Signup with unique email and hashed password
//! - Login by email and password
//! - User reads

use anyhow::Context;

use super::password::{hash_password, verify_password};
use super::validation::require_non_blank;
use super::{finish_transaction, ServiceError};
use crate::db::{DynRecordStore, StoreError, StoreTransaction};
use crate::models::{LoginInput, RegisterInput, User};

/// User service for signup, login and user reads
pub struct UserService {
    store: DynRecordStore,
}

impl UserService {
    /// Create a new user service over the given record store
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    /// Register a new user.
    ///
    /// The new user starts with empty `blogs` and `comments` lists.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if name, email or password is blank
    /// - `Conflict` if the email is already registered
    /// - `Internal` for store or hashing failures
    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        require_non_blank("name", &input.name)?;
        require_non_blank("email", &input.email)?;
        if input.password.is_empty() {
            return Err(ServiceError::InvalidInput("password must not be empty".to_string()));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.name, input.email.trim().to_string(), password_hash);

        let mut tx = self.store.begin().await?;
        let outcome = insert_new_user(tx.as_mut(), user).await;
        let user = finish_transaction(tx, outcome).await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no user has this email
    /// - `Unauthorized` if the password does not match
    pub async fn login(&self, input: LoginInput) -> Result<User, ServiceError> {
        let email = input.email.trim();

        let mut tx = self.store.begin().await?;
        let outcome = tx.find_user_by_email(email).await.map_err(ServiceError::from);
        let user = finish_transaction(tx, outcome).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("No user registered with email '{}'", email))
        })?;

        let valid = verify_password(&input.password, &user.password)
            .context("Failed to verify password")?;
        if !valid {
            tracing::warn!("Failed login attempt for user {}", user.id);
            return Err(ServiceError::Unauthorized("Incorrect password".to_string()));
        }

        Ok(user)
    }

    /// All users in insertion order
    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.list_users().await.map_err(ServiceError::from);
        finish_transaction(tx, outcome).await
    }

    /// Get a user by id
    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.find_user(id).await.map_err(ServiceError::from);
        finish_transaction(tx, outcome)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' does not exist", id)))
    }
}

async fn insert_new_user(tx: &mut dyn StoreTransaction, user: User) -> Result<User, ServiceError> {
    if tx.find_user_by_email(&user.email).await?.is_some() {
        return Err(email_taken(&user.email));
    }

    match tx.insert_user(&user).await {
        Ok(()) => Ok(user),
        Err(e) if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::Duplicate { .. })) => {
            Err(email_taken(&user.email))
        }
        Err(e) => Err(e.into()),
    }
}

fn email_taken(email: &str) -> ServiceError {
    ServiceError::Conflict(format!("Email '{}' is already registered", email))
}
