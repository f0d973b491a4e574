//! API error type and its JSON wire shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::core_state::CoreError;
use crate::pipeline::AnalysisError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("System not initialized. Configure API keys first")]
    NotInitialized,

    #[error("Configuration failed: {0}")]
    Configure(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            Self::BadRequest(_) => ("BAD_REQUEST", StatusCode::BAD_REQUEST),
            Self::NotInitialized => ("NOT_INITIALIZED", StatusCode::BAD_REQUEST),
            Self::Configure(_) => ("CONFIGURE_FAILED", StatusCode::INTERNAL_SERVER_ERROR),
            Self::Analysis(_) => ("ANALYSIS_FAILED", StatusCode::INTERNAL_SERVER_ERROR),
            Self::Internal(_) => ("INTERNAL", StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        } else {
            tracing::debug!(code, %message, "request rejected");
        }
        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotInitialized => Self::NotInitialized,
            CoreError::MissingCredentials(_) => Self::BadRequest(err.to_string()),
            CoreError::LockPoisoned => Self::Internal(err.to_string()),
            CoreError::Assembly(_) => Self::Configure(err.to_string()),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::MissingField(_) => Self::BadRequest(err.to_string()),
            _ => Self::Analysis(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_maps_to_bad_request() {
        let api: ApiError =
            CoreError::MissingCredentials("openai_api_key".to_string()).into();
        assert!(matches!(api, ApiError::BadRequest(_)));
        assert!(api.to_string().contains("openai_api_key"));
    }

    #[test]
    fn not_initialized_maps_through() {
        let api: ApiError = CoreError::NotInitialized.into();
        assert!(matches!(api, ApiError::NotInitialized));
    }

    #[test]
    fn missing_field_maps_to_bad_request() {
        let api: ApiError = AnalysisError::MissingField("ingredients").into();
        assert!(matches!(api, ApiError::BadRequest(_)));
    }

    #[test]
    fn missing_verdict_maps_to_analysis_failure() {
        let api: ApiError = AnalysisError::MissingVerdict.into();
        assert!(matches!(api, ApiError::Analysis(_)));
    }
}
