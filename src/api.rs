//! HTTP API for the chat pipeline.
//!
//! Endpoints for posting a visitor message, reading a transcript, and a
//! health check. Each chat request runs in its own task so a dropped client
//! connection does not cancel provider calls or the transcript write.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info, warn};
use vitae_core::{config::ApiConfig, error::VitaeError, message::ChatMessage};

use crate::gateway::Gateway;

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    gateway: Gateway,
    api_key: Option<String>,
    uptime: Instant,
}

/// `POST .../chat/message` request body.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

/// Constant-time string comparison for the service token.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth. Returns `None` if authorized, `Some(response)` if rejected.
fn check_auth(headers: &HeaderMap, api_key: &Option<String>) -> Option<ApiError> {
    let key = api_key.as_ref()?;

    let Some(header) = headers.get("authorization") else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing Authorization header"})),
        ));
    };

    let Ok(value) = header.to_str() else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid Authorization header"})),
        ));
    };

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => None,
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid token"})),
        )),
    }
}

fn message_json(m: &ChatMessage) -> Value {
    json!({
        "id": m.id,
        "message": m.message,
        "response": m.response,
        "created_at": m.created_at,
    })
}

/// `GET /api/health` — liveness and uptime.
async fn health(headers: HeaderMap, State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_key) {
        return Err(err);
    }

    Ok(Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
    })))
}

/// `POST /api/users/{user_id}/chat/message` — answer and record one message.
async fn post_message(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_key) {
        return Err(err);
    }

    let message = body.message.unwrap_or_default();
    let gateway = state.gateway.clone();
    let task =
        tokio::spawn(async move { gateway.handle_chat_message(user_id, &message).await });

    match task.await {
        Ok(Ok(reply)) => Ok(Json(message_json(&reply))),
        Ok(Err(VitaeError::Validation(reason))) => {
            Err((StatusCode::BAD_REQUEST, Json(json!({"error": reason}))))
        }
        Ok(Err(e)) => {
            error!("chat message for user {user_id} failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to process message"})),
            ))
        }
        Err(e) => {
            error!("chat task for user {user_id} aborted: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to process message"})),
            ))
        }
    }
}

/// `GET /api/users/{user_id}/chat/messages` — transcript, oldest first.
async fn list_messages(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_key) {
        return Err(err);
    }

    let messages = state.gateway.transcript(user_id).await.map_err(|e| {
        warn!("transcript read for user {user_id} failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "failed to fetch messages"})),
        )
    })?;

    Ok(Json(Value::Array(messages.iter().map(message_json).collect())))
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/users/{user_id}/chat/message", post(post_message))
        .route("/api/users/{user_id}/chat/messages", get(list_messages))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Bind and run the API server until it fails.
pub async fn serve(config: &ApiConfig, gateway: Gateway) -> anyhow::Result<()> {
    let api_key = if config.api_key.is_empty() {
        None
    } else {
        Some(config.api_key.clone())
    };

    let state = ApiState {
        gateway,
        api_key,
        uptime: Instant::now(),
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("API server failed to bind to {addr}: {e}"))?;

    info!("API server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
