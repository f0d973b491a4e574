//! Contextual compression: over-fetch candidates from a base retriever,
//! then keep only what a reranker scores as relevant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::retrieval::{Passage, RetrievalError, Retriever};

/// A reranker's judgement on one candidate document.
#[derive(Debug, Clone)]
pub struct RankedDocument {
    /// Index into the candidate slice passed to `rerank`.
    pub index: usize,
    pub relevance: f32,
}

/// Scores candidate documents against a query and keeps the best `top_n`,
/// in rerank order.
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RankedDocument>, RetrievalError>;
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

/// Cohere `/v2/rerank` client (`rerank-english-v3.0`).
pub struct CohereReranker {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl CohereReranker {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config::COHERE_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: config::RERANK_MODEL.to_string(),
            timeout_secs: 60,
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Reranker for CohereReranker {
    fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RankedDocument>, RetrievalError> {
        let url = format!("{}/v2/rerank", self.base_url);
        let body = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .map_err(|e| RetrievalError::Rerank(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RetrievalError::Rerank(format!("{status}: {body}")));
        }

        let parsed: RerankResponse = response
            .json()
            .map_err(|e| RetrievalError::Rerank(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RankedDocument {
                index: r.index,
                relevance: r.relevance_score,
            })
            .collect())
    }
}

/// The `compression` strategy: fetch a wide candidate set, return the
/// reranker's top picks with rerank relevance as the score.
pub struct CompressionRetriever {
    base: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    top_n: usize,
}

impl CompressionRetriever {
    pub fn new(base: Arc<dyn Retriever>, reranker: Arc<dyn Reranker>, top_n: usize) -> Self {
        Self {
            base,
            reranker,
            top_n,
        }
    }
}

impl Retriever for CompressionRetriever {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError> {
        let candidates = self.base.query(question)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = candidates.iter().map(|p| p.content.clone()).collect();
        let ranked = self.reranker.rerank(question, &documents, self.top_n)?;

        Ok(ranked
            .into_iter()
            .filter_map(|doc| {
                candidates.get(doc.index).map(|p| Passage {
                    content: p.content.clone(),
                    score: doc.relevance,
                })
            })
            .collect())
    }
}

/// Identity-order reranker for tests: keeps the first `top_n` candidates
/// with descending synthetic scores.
pub struct MockReranker;

impl Reranker for MockReranker {
    fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RankedDocument>, RetrievalError> {
        Ok(documents
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(i, _)| RankedDocument {
                index: i,
                relevance: 1.0 - i as f32 * 0.1,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRetriever(Vec<&'static str>);

    impl Retriever for FixedRetriever {
        fn query(&self, _question: &str) -> Result<Vec<Passage>, RetrievalError> {
            Ok(self
                .0
                .iter()
                .map(|c| Passage {
                    content: c.to_string(),
                    score: 0.5,
                })
                .collect())
        }
    }

    struct ReversingReranker;

    impl Reranker for ReversingReranker {
        fn rerank(
            &self,
            _query: &str,
            documents: &[String],
            top_n: usize,
        ) -> Result<Vec<RankedDocument>, RetrievalError> {
            Ok((0..documents.len())
                .rev()
                .take(top_n)
                .enumerate()
                .map(|(rank, index)| RankedDocument {
                    index,
                    relevance: 1.0 - rank as f32 * 0.1,
                })
                .collect())
        }
    }

    #[test]
    fn returns_reranker_order_with_rerank_scores() {
        let retriever = CompressionRetriever::new(
            Arc::new(FixedRetriever(vec!["first", "second", "third"])),
            Arc::new(ReversingReranker),
            2,
        );
        let results = retriever.query("q").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "third");
        assert_eq!(results[1].content, "second");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn empty_candidates_skip_rerank() {
        let retriever =
            CompressionRetriever::new(Arc::new(FixedRetriever(vec![])), Arc::new(MockReranker), 5);
        assert!(retriever.query("q").unwrap().is_empty());
    }

    #[test]
    fn mock_reranker_caps_at_top_n() {
        let docs: Vec<String> = (0..10).map(|i| format!("doc {i}")).collect();
        let ranked = MockReranker.rerank("q", &docs, 3).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].index, 0);
    }

    #[test]
    fn out_of_range_index_is_dropped() {
        struct BadIndexReranker;
        impl Reranker for BadIndexReranker {
            fn rerank(
                &self,
                _query: &str,
                _documents: &[String],
                _top_n: usize,
            ) -> Result<Vec<RankedDocument>, RetrievalError> {
                Ok(vec![RankedDocument {
                    index: 99,
                    relevance: 0.9,
                }])
            }
        }
        let retriever = CompressionRetriever::new(
            Arc::new(FixedRetriever(vec!["only"])),
            Arc::new(BadIndexReranker),
            1,
        );
        assert!(retriever.query("q").unwrap().is_empty());
    }
}
