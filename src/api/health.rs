use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;

/// Reports liveness without touching the database.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = if state.db.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database
    }))
}
