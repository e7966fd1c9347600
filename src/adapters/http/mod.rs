//! HTTP adapters - REST API implementations.

pub mod wellness;

use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use wellness::WellnessHandlers;

/// Full API router with request tracing and a per-request timeout.
pub fn api_router(handlers: WellnessHandlers, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/users/:user_id", wellness::user_routes(handlers))
        .nest("/api", wellness::catalog_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
