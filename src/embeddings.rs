//! Text embedding providers for the vector index.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Cannot reach embedding service: {0}")]
    Connection(String),

    #[error("Embedding service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected embedding response: {0}")]
    ResponseParsing(String),

    #[error("Embedding request failed: {0}")]
    Http(String),
}

/// Turns text into fixed-dimension vectors. The vector index only ever
/// compares vectors produced by the same provider instance.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
    fn dimension(&self) -> usize;
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI `/v1/embeddings` client (`text-embedding-3-small`).
pub struct OpenAiEmbeddings {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiEmbeddings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config::OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: config::EMBEDDING_MODEL.to_string(),
            timeout_secs: 60,
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, input: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    EmbeddingError::Connection(e.to_string())
                } else {
                    EmbeddingError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .map_err(|e| EmbeddingError::ResponseParsing(e.to_string()))?;

        // The API documents data[] as request-ordered, but it also carries
        // an index field; honor it rather than assume.
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);
        if items.len() != input.len() {
            return Err(EmbeddingError::ResponseParsing(format!(
                "expected {} embeddings, got {}",
                input.len(),
                items.len()
            )));
        }
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

impl EmbeddingProvider for OpenAiEmbeddings {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.request(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::ResponseParsing("empty data array".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn dimension(&self) -> usize {
        config::EMBEDDING_DIMENSION
    }
}

/// Deterministic bag-of-words embedder for offline use in tests: hashes
/// each token into a bucket and L2-normalizes the counts. Shared vocabulary
/// between texts yields higher cosine similarity, which is all the
/// retrieval tests rely on.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vector = vec![0.0f32; self.dim];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dim;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("whole grain oats").unwrap();
        let b = embedder.embed("whole grain oats").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_embedder_normalizes() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("sugar corn syrup honey").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn batch_matches_single() {
        let embedder = HashEmbedder::new(32);
        let batch = embedder.embed_batch(&["oats", "sugar"]).unwrap();
        assert_eq!(batch[0], embedder.embed("oats").unwrap());
        assert_eq!(batch[1], embedder.embed("sugar").unwrap());
    }
}
