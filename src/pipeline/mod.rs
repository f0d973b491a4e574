// The retrieve-then-analyze workflow that turns an ingredient list into a
// verdict plus grounded explanation.

pub mod analyzer;
pub mod prompt;
pub mod verdict;

use thiserror::Error;

use crate::llm::LlmError;
use crate::retrieval::RetrievalError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] LlmError),

    #[error("Model response did not begin with a verdict line")]
    MissingVerdict,
}
