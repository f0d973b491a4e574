//! Strategy tags and the retriever selector with its fallback rules.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::llm::ChatModel;
use crate::retrieval::bm25::Bm25Retriever;
use crate::retrieval::compression::{CompressionRetriever, Reranker};
use crate::retrieval::ensemble::EnsembleRetriever;
use crate::retrieval::index::{NaiveRetriever, VectorIndex};
use crate::retrieval::multi_query::MultiQueryRetriever;
use crate::retrieval::Retriever;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Naive,
    Bm25,
    MultiQuery,
    Compression,
    Ensemble,
}

impl Strategy {
    /// Unknown tags fall back to `Ensemble` rather than erroring.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "naive" => Self::Naive,
            "bm25" => Self::Bm25,
            "multi_query" => Self::MultiQuery,
            "compression" => Self::Compression,
            "ensemble" => Self::Ensemble,
            other => {
                tracing::warn!(tag = other, "unknown retrieval strategy, using ensemble");
                Self::Ensemble
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Bm25 => "bm25",
            Self::MultiQuery => "multi_query",
            Self::Compression => "compression",
            Self::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the selector hands back: the assembled retriever and the strategy
/// actually in effect after fallback. The effective tag is what Configure
/// reports to callers.
pub struct Selection {
    pub retriever: Arc<dyn Retriever>,
    pub effective: Strategy,
}

/// Assemble the requested strategy from the shared collaborators.
///
/// Fallback rules:
/// - `compression` without a reranker degrades to `naive` and reports so;
/// - `ensemble` without a reranker simply omits the compression member and
///   still reports `ensemble`.
///
/// Selection itself never fails; strategies surface their errors at query
/// time.
pub fn select_retriever(
    requested: Strategy,
    index: Arc<VectorIndex>,
    expansion_chat: Arc<dyn ChatModel>,
    reranker: Option<Arc<dyn Reranker>>,
    k: usize,
) -> Selection {
    match requested {
        Strategy::Naive => Selection {
            retriever: Arc::new(NaiveRetriever::new(index, k)),
            effective: Strategy::Naive,
        },
        Strategy::Bm25 => Selection {
            retriever: Arc::new(Bm25Retriever::new(&index.contents(), k)),
            effective: Strategy::Bm25,
        },
        Strategy::MultiQuery => {
            let base = Arc::new(NaiveRetriever::new(index, k));
            Selection {
                retriever: Arc::new(MultiQueryRetriever::new(base, expansion_chat)),
                effective: Strategy::MultiQuery,
            }
        }
        Strategy::Compression => match reranker {
            Some(reranker) => {
                let base = Arc::new(NaiveRetriever::new(index, k * 2));
                Selection {
                    retriever: Arc::new(CompressionRetriever::new(base, reranker, k)),
                    effective: Strategy::Compression,
                }
            }
            None => {
                tracing::warn!("compression requested without a rerank key, using naive");
                Selection {
                    retriever: Arc::new(NaiveRetriever::new(index, k)),
                    effective: Strategy::Naive,
                }
            }
        },
        Strategy::Ensemble => {
            let mut members: Vec<Arc<dyn Retriever>> = vec![
                Arc::new(NaiveRetriever::new(Arc::clone(&index), k)),
                Arc::new(Bm25Retriever::new(&index.contents(), k)),
            ];
            if let Some(reranker) = reranker {
                let base = Arc::new(NaiveRetriever::new(Arc::clone(&index), k * 2));
                members.push(Arc::new(CompressionRetriever::new(base, reranker, k)));
            }
            Selection {
                retriever: Arc::new(EnsembleRetriever::with_equal_weights(members, k)),
                effective: Strategy::Ensemble,
            }
        }
    }
}
