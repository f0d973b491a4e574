//! Route table for the analysis API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints::{analyze, cereals, configure, status};
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext { core };

    Router::new()
        .route("/api/cereals", get(cereals::list))
        .route("/api/configure", post(configure::configure))
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/status", get(status::status))
        .with_state(ctx)
        // The original surface is consumed by a browser frontend on a
        // different origin.
        .layer(CorsLayer::permissive())
}
