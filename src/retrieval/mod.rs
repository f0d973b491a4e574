// Retrieval: the Retriever capability and the five strategy implementations.
//
// Every strategy returns passages in relevance order with stable ties; the
// analysis pipeline consumes whatever count a retriever produces without
// re-validating it.

pub mod bm25;
pub mod compression;
pub mod ensemble;
pub mod index;
pub mod multi_query;
pub mod strategy;

use serde::Serialize;
use thiserror::Error;

/// A retrieved knowledge-base excerpt. Rank is the position in the
/// returned vector; `score` is strategy-specific (cosine, BM25, RRF or
/// rerank relevance) and only comparable within one result set.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub content: String,
    pub score: f32,
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Rerank failed: {0}")]
    Rerank(String),

    #[error("Query expansion failed: {0}")]
    QueryExpansion(String),

    #[error("Vector index has no chunks")]
    EmptyIndex,

    #[error("Expected {expected}-dimensional embedding, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Expected {expected} ensemble weights, got {got}")]
    InvalidWeights { expected: usize, got: usize },
}

/// One question in, ranked passages out. All strategies implement this;
/// composite strategies (multi-query, compression, ensemble) wrap other
/// implementations behind the same seam.
pub trait Retriever: Send + Sync {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError>;
}
