use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::types::ApiContext;

/// GET /api/cereals — the bundled cereal listing.
pub async fn list(State(ctx): State<ApiContext>) -> Json<Value> {
    Json(serde_json::json!({ "cereals": ctx.core.cereals() }))
}
