use axum::Json;
use serde_json::{json, Value};

pub async fn healthz() -> Json<Value> {
    tracing::debug!("service is live");
    Json(json!({ "status": "ok" }))
}
