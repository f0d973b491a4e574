//! Request/response DTOs shared by the endpoints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::pipeline::verdict::Verdict;

/// Injected into every handler via `State`.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigureRequest {
    pub openai_api_key: Option<String>,
    pub langsmith_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub retrieval_strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub success: bool,
    pub message: String,
    pub retrieval_strategy: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cereal_name: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub cereal_name: String,
    pub ingredients: String,
    pub verdict: Verdict,
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub initialized: bool,
    pub has_api_keys: bool,
}
