//! API Router
//!
//! Combines the API endpoints from the specialized modules into a unified
//! router. This provides a centralized configuration for all REST routes.

use axum::{response::Json, routing::get, Router};
use std::sync::Arc;

use crate::shared::state::AppState;

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // ===== Course Catalog & Playback State (catalog module) =====
        .merge(crate::catalog::configure_catalog_routes())
        // ===== Liveness =====
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
