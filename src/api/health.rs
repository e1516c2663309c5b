use axum::response::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "fitnease-planning",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
