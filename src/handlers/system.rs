use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Noteful API",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store_name(),
        "endpoints": {
            "notes": "/api/notes[/:id]",
            "folders": "/api/folders[/:id]",
            "tags": "/api/tags[/:id]",
            "users": "/api/users[/:id]",
            "health": "/health"
        }
    })))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.health_check().await?;
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "store": state.store_name()
    })))
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
