//! Shared API state and errors
//!
//! `AppState` carries the record store and the coordinator services into
//! every handler. `ApiError` is the body of transport-level failures, i.e.
//! requests that never reached an operation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::DynRecordStore;
use crate::services::{BlogService, CommentService, UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: DynRecordStore,
    pub user_service: Arc<UserService>,
    pub blog_service: Arc<BlogService>,
    pub comment_service: Arc<CommentService>,
}

impl AppState {
    /// Build the services on top of one record store
    pub fn new(store: DynRecordStore) -> Self {
        Self {
            user_service: Arc::new(UserService::new(store.clone())),
            blog_service: Arc::new(BlogService::new(store.clone())),
            comment_service: Arc::new(CommentService::new(store.clone())),
            store,
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Body could not be read as an operation envelope
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("INVALID_REQUEST", message)
    }

    pub fn unknown_operation(name: &str) -> Self {
        Self::with_details(
            "UNKNOWN_OPERATION",
            format!("Unknown operation '{}'", name),
            serde_json::json!({ "operation": name }),
        )
    }

    pub fn invalid_arguments(operation: &str, message: impl Into<String>) -> Self {
        Self::with_details(
            "INVALID_ARGUMENTS",
            message,
            serde_json::json!({ "operation": operation }),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("UNAVAILABLE", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "INVALID_REQUEST" | "INVALID_ARGUMENTS" => StatusCode::BAD_REQUEST,
            "UNKNOWN_OPERATION" => StatusCode::NOT_FOUND,
            "UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}
