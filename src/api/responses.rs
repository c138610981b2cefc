//! Shared API response types

use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// User as returned to callers; the password hash never leaves the server
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub blogs: Vec<String>,
    pub comments: Vec<String>,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            blogs: user.blogs,
            comments: user.comments,
        }
    }
}

/// Result of an executed operation.
///
/// Exactly one of `data` and `error` is non-null.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResponse {
    pub data: Option<serde_json::Value>,
    pub error: Option<OperationError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OperationError {
    pub code: String,
    pub message: String,
}

impl OperationResponse {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(OperationError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

impl From<ServiceError> for OperationResponse {
    fn from(err: ServiceError) -> Self {
        let message = match &err {
            ServiceError::Internal(e) => {
                tracing::error!("Operation failed: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        Self::failure(err.code(), message)
    }
}
