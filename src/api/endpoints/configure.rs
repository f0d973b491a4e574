use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ConfigureRequest, ConfigureResponse};
use crate::core_state::Credentials;

/// POST /api/configure — store credentials and (re)build the pipeline.
pub async fn configure(
    State(ctx): State<ApiContext>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<ConfigureResponse>, ApiError> {
    let credentials = Credentials {
        openai_api_key: request.openai_api_key.unwrap_or_default(),
        langsmith_api_key: request.langsmith_api_key.unwrap_or_default(),
        cohere_api_key: request.cohere_api_key,
        tavily_api_key: request.tavily_api_key,
    };
    let requested = request
        .retrieval_strategy
        .unwrap_or_else(|| "ensemble".to_string());

    // Index building embeds every chunk over blocking HTTP.
    let core = ctx.core.clone();
    let effective = tokio::task::spawn_blocking(move || core.configure(credentials, &requested))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(ConfigureResponse {
        success: true,
        message: format!(
            "API keys configured and analysis pipeline initialized with {effective} retrieval"
        ),
        retrieval_strategy: effective.as_str().to_string(),
    }))
}
