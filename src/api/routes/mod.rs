//! Route handlers.

use axum::Json;
use serde_json::{json, Value};

pub mod matches;
pub mod stats;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
