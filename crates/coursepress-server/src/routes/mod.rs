pub mod avatars;
pub mod config;
pub mod courses;
pub mod moments;

use axum::Json;

use crate::error::AppError;

/// GET /api/health: liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Fallback for unknown API paths.
pub async fn api_not_found(uri: axum::http::Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}
