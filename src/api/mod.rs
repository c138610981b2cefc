//! API layer - HTTP handlers and routing
//!
//! This module exposes the blogwire operations over HTTP:
//! - `POST /api/v1/operations` - run one named operation
//! - `GET /api/v1/health` - record store reachability

pub mod gateway;
pub mod middleware;
pub mod responses;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};
pub use responses::{OperationResponse, UserResponse};

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/operations", post(gateway::execute_operation))
        .route("/health", get(gateway::health))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if cors_origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(
                "Invalid CORS origin '{}' ({}), cross-origin requests disabled",
                cors_origin,
                e
            );
            cors
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::{create_test_store, MemoryRecordStore};

    async fn test_router() -> Router {
        let store = create_test_store().await.expect("Failed to create test store");
        build_router(AppState::new(store), "*")
    }

    async fn call(router: &Router, operation: &str, arguments: Value) -> (StatusCode, Value) {
        let body = json!({ "operation": operation, "arguments": arguments });
        post_raw(router, body.to_string()).await
    }

    async fn post_raw(router: &Router, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/operations")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_full_comment_lifecycle_over_http() {
        let router = test_router().await;

        let (status, body) = call(
            &router,
            "signup",
            json!({"name": "Ann", "email": "ann@x.com", "password": "password1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_null());
        assert!(body["data"].get("password").is_none());
        let ann_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = call(
            &router,
            "addBlog",
            json!({"title": "T", "content": "C", "date": "2024-01-01", "user": ann_id}),
        )
        .await;
        let blog_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = call(
            &router,
            "addCommentToBlog",
            json!({"blog": blog_id, "user": ann_id, "text": "nice!", "date": "2024-01-02"}),
        )
        .await;
        let comment_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = call(&router, "blog", json!({ "id": blog_id })).await;
        assert_eq!(body["data"]["comments"], json!([comment_id]));

        let (_, body) = call(&router, "deleteComment", json!({ "id": comment_id })).await;
        assert_eq!(body["data"]["id"], json!(comment_id));

        let (_, body) = call(&router, "users", Value::Null).await;
        assert_eq!(body["data"][0]["blogs"], json!([blog_id]));
        assert_eq!(body["data"][0]["comments"], json!([]));

        let (_, body) = call(&router, "comments", Value::Null).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_operation_errors_are_values() {
        let router = test_router().await;
        let signup = json!({"name": "Ann", "email": "ann@x.com", "password": "pw"});
        call(&router, "signup", signup.clone()).await;

        let (status, body) = call(&router, "signup", signup).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, body) = call(
            &router,
            "login",
            json!({"email": "ann@x.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (_, body) = call(&router, "deleteBlog", json!({"id": "missing"})).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (_, body) = call(
            &router,
            "addBlog",
            json!({"title": "", "content": "C", "date": "2024-01-01", "user": "u"}),
        )
        .await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_transport_errors_use_http_status() {
        let router = test_router().await;

        let (status, body) = post_raw(&router, "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");

        let (status, body) = call(&router, "dropTables", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "UNKNOWN_OPERATION");

        let (status, body) = call(&router, "login", json!({"email": "ann@x.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENTS");
    }

    #[tokio::test]
    async fn test_health() {
        let state = AppState::new(MemoryRecordStore::new().boxed());
        let router = build_router(state, "http://localhost:3000");

        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["driver"], "memory");
    }

    #[test]
    fn test_invalid_cors_origin_does_not_panic() {
        let _ = cors_layer("not a valid\nheader");
        let _ = cors_layer("*");
    }
}
