use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health - Liveness plus the current product count
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let products = state.catalog.list().await.len();
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "products": products,
    }))
}
