//! HTTP transport for the todo gateway.
//!
//! # Endpoints
//!
//! - `GET /`: list all todo items
//! - `POST /`: create a todo item
//! - `GET /{id}`: fetch one item
//! - `PUT /{id}`: replace title and description of an item
//! - `DELETE /{id}`: delete an item
//! - `GET /health/live`: health check, reports store reachability
//!
//! Request bodies are read as raw bytes and decoded by the gateway so that
//! every decoding failure surfaces as `malformed_payload`.

mod error;

pub use error::ErrorBody;

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::codec;
use crate::gateway::{GatewayError, TodoGateway};
use crate::models::TodoItem;

/// Acknowledgement code returned by a successful delete.
pub const DELETE_COMPLETE: &str = "DELETE_COMPLETE";

/// Path of the health check. Two segments, so it never shadows `/{id}`.
pub const HEALTH_PATH: &str = "/health/live";

/// Build the application router.
pub fn router(gateway: TodoGateway, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route(HEALTH_PATH, get(health))
        .route(
            "/{id}",
            get(get_todo).put(replace_todo).delete(delete_todo),
        )
        .with_state(gateway)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            request_deadline,
        ))
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Deadline
// ============================================================================

/// Abort requests that run past `timeout` with a 408 error body.
///
/// The inner future is dropped on expiry, which cancels any in-flight store
/// call and returns its pooled connection.
async fn request_deadline(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("{} {} exceeded deadline of {:?}", method, uri, timeout);
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorBody {
                    error: "timeout".to_string(),
                    message: format!("Request exceeded deadline of {:?}", timeout),
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_todos(
    State(gateway): State<TodoGateway>,
) -> Result<Json<Vec<TodoItem>>, GatewayError> {
    Ok(Json(gateway.list().await?))
}

/// A single item, serialized by the codec.
struct ItemResponse(StatusCode, TodoItem);

impl IntoResponse for ItemResponse {
    fn into_response(self) -> Response {
        match codec::encode_item(&self.1) {
            Ok(bytes) => (
                self.0,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            Err(e) => GatewayError::from(e).into_response(),
        }
    }
}

async fn get_todo(
    State(gateway): State<TodoGateway>,
    Path(id): Path<String>,
) -> Result<ItemResponse, GatewayError> {
    let item = gateway.get(&id).await?;
    Ok(ItemResponse(StatusCode::OK, item))
}

async fn create_todo(
    State(gateway): State<TodoGateway>,
    body: Bytes,
) -> Result<ItemResponse, GatewayError> {
    let item = gateway.create(&body).await?;
    Ok(ItemResponse(StatusCode::CREATED, item))
}

async fn replace_todo(
    State(gateway): State<TodoGateway>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ItemResponse, GatewayError> {
    let item = gateway.replace(&id, &body).await?;
    Ok(ItemResponse(StatusCode::OK, item))
}

/// Delete acknowledgement body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeleteAck {
    pub code: String,
}

async fn delete_todo(
    State(gateway): State<TodoGateway>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, GatewayError> {
    gateway.delete(&id).await?;
    Ok(Json(DeleteAck {
        code: DELETE_COMPLETE.to_string(),
    }))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health(State(gateway): State<TodoGateway>) -> Response {
    let version = env!("CARGO_PKG_VERSION").to_string();

    match gateway.store().ping().await {
        Ok(()) => Json(HealthResponse {
            status: "ok".to_string(),
            version,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    version,
                }),
            )
                .into_response()
        }
    }
}
