use axum::extract::State;
use axum::Json;

use crate::api::types::{ApiContext, StatusResponse};

/// GET /api/status — readiness without leaking credential values.
pub async fn status(State(ctx): State<ApiContext>) -> Json<StatusResponse> {
    Json(StatusResponse {
        initialized: ctx.core.is_initialized(),
        has_api_keys: ctx.core.has_credentials(),
    })
}
