//! Reciprocal-rank-fusion ensemble over several retrievers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::retrieval::{Passage, RetrievalError, Retriever};

/// Smoothing constant in the RRF denominator.
const RRF_K: f32 = 60.0;

pub struct EnsembleRetriever {
    retrievers: Vec<Arc<dyn Retriever>>,
    weights: Vec<f32>,
    k: usize,
}

impl std::fmt::Debug for EnsembleRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleRetriever")
            .field("retrievers", &self.retrievers.len())
            .field("weights", &self.weights)
            .field("k", &self.k)
            .finish()
    }
}

impl EnsembleRetriever {
    /// `weights` defaults to equal weights summing to 1. A weight list of
    /// the wrong length is a construction error.
    pub fn new(
        retrievers: Vec<Arc<dyn Retriever>>,
        weights: Option<Vec<f32>>,
        k: usize,
    ) -> Result<Self, RetrievalError> {
        let weights = match weights {
            Some(w) => {
                if w.len() != retrievers.len() {
                    return Err(RetrievalError::InvalidWeights {
                        expected: retrievers.len(),
                        got: w.len(),
                    });
                }
                w
            }
            None => {
                let equal = 1.0 / retrievers.len().max(1) as f32;
                vec![equal; retrievers.len()]
            }
        };
        Ok(Self {
            retrievers,
            weights,
            k,
        })
    }

    /// Equal weights summing to 1; cannot fail.
    pub fn with_equal_weights(retrievers: Vec<Arc<dyn Retriever>>, k: usize) -> Self {
        let equal = 1.0 / retrievers.len().max(1) as f32;
        let weights = vec![equal; retrievers.len()];
        Self {
            retrievers,
            weights,
            k,
        }
    }
}

impl Retriever for EnsembleRetriever {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError> {
        // Fused score per distinct content: sum of w / (rank + 1 + 60) over
        // every list the passage appears in. First-seen order breaks ties.
        let mut order: Vec<String> = Vec::new();
        let mut scores: HashMap<String, f32> = HashMap::new();

        for (retriever, weight) in self.retrievers.iter().zip(&self.weights) {
            for (rank, passage) in retriever.query(question)?.into_iter().enumerate() {
                let fused = weight / (rank as f32 + 1.0 + RRF_K);
                match scores.get_mut(&passage.content) {
                    Some(score) => *score += fused,
                    None => {
                        scores.insert(passage.content.clone(), fused);
                        order.push(passage.content);
                    }
                }
            }
        }

        let mut fused: Vec<Passage> = order
            .into_iter()
            .map(|content| {
                let score = scores.get(&content).copied().unwrap_or(0.0);
                Passage { content, score }
            })
            .collect();

        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused.truncate(self.k);
        Ok(fused)
    }
}
