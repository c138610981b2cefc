//! Operation gateway
//!
//! `POST /api/v1/operations` takes `{"operation": name, "arguments": {...}}`
//! and answers with an `OperationResponse`. Once an operation has run, the
//! HTTP status is 200 whether it succeeded or not; the outcome lives in the
//! body. Only requests that cannot be mapped to an operation get an
//! `ApiError`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::middleware::{ApiError, AppState};
use super::responses::{OperationResponse, UserResponse};
use crate::models::{
    CreateBlogInput, CreateCommentInput, LoginInput, RegisterInput, UpdateBlogInput,
};
use crate::services::ServiceError;

/// Raw request envelope
#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct IdArgument {
    pub id: String,
}

/// A request resolved to a known operation with typed arguments
#[derive(Debug)]
pub enum Operation {
    Users,
    Blogs,
    Comments,
    User(IdArgument),
    Blog(IdArgument),
    Comment(IdArgument),
    Signup(RegisterInput),
    Login(LoginInput),
    AddBlog(CreateBlogInput),
    UpdateBlog(UpdateBlogInput),
    DeleteBlog(IdArgument),
    AddCommentToBlog(CreateCommentInput),
    DeleteComment(IdArgument),
}

impl Operation {
    /// Resolve the operation name and decode its arguments.
    pub fn parse(request: OperationRequest) -> Result<Self, ApiError> {
        let OperationRequest { operation, arguments } = request;
        let name = operation.as_str();

        let parsed = match name {
            "users" => Operation::Users,
            "blogs" => Operation::Blogs,
            "comments" => Operation::Comments,
            "user" => Operation::User(arguments_for(name, arguments)?),
            "blog" => Operation::Blog(arguments_for(name, arguments)?),
            "comment" => Operation::Comment(arguments_for(name, arguments)?),
            "signup" => Operation::Signup(arguments_for(name, arguments)?),
            "login" => Operation::Login(arguments_for(name, arguments)?),
            "addBlog" => Operation::AddBlog(arguments_for(name, arguments)?),
            "updateBlog" => Operation::UpdateBlog(arguments_for(name, arguments)?),
            "deleteBlog" => Operation::DeleteBlog(arguments_for(name, arguments)?),
            "addCommentToBlog" => Operation::AddCommentToBlog(arguments_for(name, arguments)?),
            "deleteComment" => Operation::DeleteComment(arguments_for(name, arguments)?),
            other => return Err(ApiError::unknown_operation(other)),
        };

        Ok(parsed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Users => "users",
            Operation::Blogs => "blogs",
            Operation::Comments => "comments",
            Operation::User(_) => "user",
            Operation::Blog(_) => "blog",
            Operation::Comment(_) => "comment",
            Operation::Signup(_) => "signup",
            Operation::Login(_) => "login",
            Operation::AddBlog(_) => "addBlog",
            Operation::UpdateBlog(_) => "updateBlog",
            Operation::DeleteBlog(_) => "deleteBlog",
            Operation::AddCommentToBlog(_) => "addCommentToBlog",
            Operation::DeleteComment(_) => "deleteComment",
        }
    }

    /// Run the operation against the services
    pub async fn execute(self, state: &AppState) -> OperationResponse {
        match self {
            Operation::Users => respond(
                state
                    .user_service
                    .list()
                    .await
                    .map(|users| users.into_iter().map(UserResponse::from).collect::<Vec<_>>()),
            ),
            Operation::Blogs => respond(state.blog_service.list().await),
            Operation::Comments => respond(state.comment_service.list().await),
            Operation::User(args) => {
                respond(state.user_service.get(&args.id).await.map(UserResponse::from))
            }
            Operation::Blog(args) => respond(state.blog_service.get(&args.id).await),
            Operation::Comment(args) => respond(state.comment_service.get(&args.id).await),
            Operation::Signup(input) => {
                respond(state.user_service.register(input).await.map(UserResponse::from))
            }
            Operation::Login(input) => {
                respond(state.user_service.login(input).await.map(UserResponse::from))
            }
            Operation::AddBlog(input) => respond(state.blog_service.create(input).await),
            Operation::UpdateBlog(input) => respond(state.blog_service.update(input).await),
            Operation::DeleteBlog(args) => respond(state.blog_service.delete(&args.id).await),
            Operation::AddCommentToBlog(input) => respond(state.comment_service.add(input).await),
            Operation::DeleteComment(args) => {
                respond(state.comment_service.delete(&args.id).await)
            }
        }
    }
}

fn arguments_for<T: DeserializeOwned>(
    operation: &str,
    arguments: serde_json::Value,
) -> Result<T, ApiError> {
    let arguments = if arguments.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        arguments
    };

    serde_json::from_value(arguments).map_err(|e| {
        ApiError::invalid_arguments(
            operation,
            format!("Invalid arguments for '{}': {}", operation, e),
        )
    })
}

fn respond<T: Serialize>(result: Result<T, ServiceError>) -> OperationResponse {
    let encoded = result.and_then(|value| {
        serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.into()))
    });
    match encoded {
        Ok(data) => OperationResponse::success(data),
        Err(err) => err.into(),
    }
}

/// Execute one operation
pub async fn execute_operation(
    State(state): State<AppState>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    let operation = Operation::parse(request)?;

    tracing::debug!("Executing operation {}", operation.name());
    let response = operation.execute(&state).await;
    if let Some(error) = &response.error {
        tracing::debug!("Operation failed with {}: {}", error.code, error.message);
    }

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub driver: crate::config::DatabaseDriver,
}

/// Report whether the record store is reachable
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::error!("Record store health check failed: {:#}", e);
        ApiError::unavailable("Record store is unreachable")
    })?;

    Ok(Json(HealthResponse {
        status: "ok",
        driver: state.store.driver(),
    }))
}
