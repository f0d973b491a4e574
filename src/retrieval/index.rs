//! In-memory vector index and the naive cosine-similarity retriever.

use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::retrieval::{Passage, RetrievalError, Retriever};

struct IndexedChunk {
    content: String,
    embedding: Vec<f32>,
}

/// Knowledge-base chunks with their embeddings, built once at configure
/// time and shared read-only by every strategy that needs vector search.
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    pub fn build(
        chunks: &[String],
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let expected = embedder.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(RetrievalError::DimensionMismatch {
                expected,
                got: bad.len(),
            });
        }

        let entries = chunks
            .iter()
            .zip(embeddings)
            .map(|(content, embedding)| IndexedChunk {
                content: content.clone(),
                embedding,
            })
            .collect();

        Ok(Self { entries, embedder })
    }

    /// The indexed chunk texts, in insertion order. BM25 builds over these
    /// so lexical and vector retrieval see identical corpora.
    pub fn contents(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.content.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed the question and return the `top_k` most similar chunks.
    /// Equal scores keep insertion order (stable sort).
    pub fn search(&self, question: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let query = self
            .embedder
            .embed(question)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;
        if query.len() != self.embedder.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.embedder.dimension(),
                got: query.len(),
            });
        }

        let mut scored: Vec<Passage> = self
            .entries
            .iter()
            .map(|entry| Passage {
                content: entry.content.clone(),
                score: cosine_similarity(&query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Plain top-k vector search. The `naive` strategy, and the base other
/// strategies compose over.
pub struct NaiveRetriever {
    index: Arc<VectorIndex>,
    k: usize,
}

impl NaiveRetriever {
    pub fn new(index: Arc<VectorIndex>, k: usize) -> Self {
        Self { index, k }
    }
}

impl Retriever for NaiveRetriever {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.index.search(question, self.k)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn build_index(texts: &[&str]) -> Arc<VectorIndex> {
        let embedder = Arc::new(HashEmbedder::new(128));
        Arc::new(VectorIndex::build(&chunks(texts), embedder).unwrap())
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn build_rejects_empty_corpus() {
        let embedder: Arc<dyn crate::embeddings::EmbeddingProvider> =
            Arc::new(HashEmbedder::new(16));
        let err = VectorIndex::build(&[], embedder).unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyIndex));
    }

    #[test]
    fn build_rejects_wrong_dimension() {
        // Claims 8 dimensions but produces 4; build must refuse rather
        // than feed mismatched vectors into cosine scoring.
        struct LyingEmbedder;
        impl crate::embeddings::EmbeddingProvider for LyingEmbedder {
            fn embed(&self, _text: &str) -> Result<Vec<f32>, crate::embeddings::EmbeddingError> {
                Ok(vec![1.0; 4])
            }
            fn embed_batch(
                &self,
                texts: &[&str],
            ) -> Result<Vec<Vec<f32>>, crate::embeddings::EmbeddingError> {
                Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
            }
            fn dimension(&self) -> usize {
                8
            }
        }

        let err = VectorIndex::build(&chunks(&["some chunk"]), Arc::new(LyingEmbedder))
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 8,
                got: 4
            }
        ));
    }

    #[test]
    fn search_ranks_matching_chunk_first() {
        let index = build_index(&[
            "added sugars like corn syrup must appear on the label",
            "whole grain oats provide fiber",
            "artificial colors such as red 40",
        ]);
        let results = index.search("corn syrup sugar label", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].content.contains("corn syrup"));
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn search_ties_keep_insertion_order() {
        // Identical chunks score identically; stable sort preserves order.
        let index = build_index(&["oats and honey", "oats and honey", "oats and honey"]);
        let results = index.search("something unrelated entirely", 3).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score == w[1].score));
    }

    #[test]
    fn naive_retriever_caps_at_k() {
        let index = build_index(&["a b c", "b c d", "c d e", "d e f", "e f g", "f g h"]);
        let retriever = NaiveRetriever::new(index, 4);
        let results = retriever.query("c d").unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn top_k_larger_than_corpus_returns_all() {
        let index = build_index(&["one", "two"]);
        let results = index.search("one", 10).unwrap();
        assert_eq!(results.len(), 2);
    }
}
