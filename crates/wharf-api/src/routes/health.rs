//! # Health Probes
//!
//! Liveness and readiness endpoints, mounted without authentication.

use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

/// Health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

async fn live() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ready() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
