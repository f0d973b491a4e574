use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeRequest, AnalyzeResponse, ApiContext};

/// POST /api/analyze — run the pipeline for one cereal.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // Initialization is checked before field presence; the analyzer Arc is
    // held for the whole request, so a concurrent reconfigure cannot swap
    // the pipeline out from under it.
    let analyzer = ctx.core.analyzer()?;

    let cereal_name = request.cereal_name.unwrap_or_default();
    let ingredients = request.ingredients.unwrap_or_default();

    let report = {
        let cereal_name = cereal_name.clone();
        let ingredients = ingredients.clone();
        tokio::task::spawn_blocking(move || analyzer.analyze(&cereal_name, &ingredients))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??
    };

    Ok(Json(AnalyzeResponse {
        success: true,
        cereal_name,
        ingredients,
        verdict: report.verdict,
        analysis: report.analysis,
    }))
}
