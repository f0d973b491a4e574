//! Transport-agnostic shared state: loaded data, credentials, and the
//! swappable analyzer slot the HTTP handlers read from.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::catalog::Cereal;
use crate::config;
use crate::embeddings::{EmbeddingProvider, OpenAiEmbeddings};
use crate::knowledge::KnowledgeBase;
use crate::llm::{ChatModel, OpenAiChat};
use crate::pipeline::analyzer::IngredientAnalyzer;
use crate::retrieval::compression::{CohereReranker, Reranker};
use crate::retrieval::index::VectorIndex;
use crate::retrieval::strategy::{self, Strategy};
use crate::retrieval::RetrievalError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("System not initialized. Configure API keys first")]
    NotInitialized,

    #[error("Missing required API keys: {0}")]
    MissingCredentials(String),

    #[error("Internal lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Assembly(#[from] RetrievalError),
}

#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub langsmith_api_key: String,
    pub cohere_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

impl Credentials {
    pub fn has_reranker(&self) -> bool {
        self.cohere_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Builds the model-facing collaborators from credentials. The seam that
/// lets the whole HTTP surface run against mocks in tests.
pub trait ProviderFactory: Send + Sync {
    fn chat(&self, credentials: &Credentials, temperature: f32) -> Arc<dyn ChatModel>;
    fn embedder(&self, credentials: &Credentials) -> Arc<dyn EmbeddingProvider>;
    fn reranker(&self, credentials: &Credentials) -> Option<Arc<dyn Reranker>>;
}

/// Live OpenAI + Cohere providers.
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn chat(&self, credentials: &Credentials, temperature: f32) -> Arc<dyn ChatModel> {
        Arc::new(OpenAiChat::new(
            credentials.openai_api_key.clone(),
            config::CHAT_MODEL,
            temperature,
        ))
    }

    fn embedder(&self, credentials: &Credentials) -> Arc<dyn EmbeddingProvider> {
        Arc::new(OpenAiEmbeddings::new(credentials.openai_api_key.clone()))
    }

    fn reranker(&self, credentials: &Credentials) -> Option<Arc<dyn Reranker>> {
        let key = credentials.cohere_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(Arc::new(CohereReranker::new(key)))
    }
}

pub struct CoreState {
    factory: Box<dyn ProviderFactory>,
    knowledge: KnowledgeBase,
    cereals: Vec<Cereal>,
    active: RwLock<Option<Arc<IngredientAnalyzer>>>,
    credentials: RwLock<Option<Credentials>>,
}

impl CoreState {
    pub fn new(
        factory: Box<dyn ProviderFactory>,
        knowledge: KnowledgeBase,
        cereals: Vec<Cereal>,
    ) -> Self {
        Self {
            factory,
            knowledge,
            cereals,
            active: RwLock::new(None),
            credentials: RwLock::new(None),
        }
    }

    pub fn cereals(&self) -> &[Cereal] {
        &self.cereals
    }

    /// Validate credentials, rebuild the whole retrieval stack, and swap
    /// the analyzer slot. Returns the strategy actually in effect after
    /// fallback. In-flight requests keep the analyzer they already cloned.
    pub fn configure(
        &self,
        credentials: Credentials,
        requested_strategy: &str,
    ) -> Result<Strategy, CoreError> {
        let mut missing = Vec::new();
        if credentials.openai_api_key.trim().is_empty() {
            missing.push("openai_api_key");
        }
        if credentials.langsmith_api_key.trim().is_empty() {
            missing.push("langsmith_api_key");
        }
        if !missing.is_empty() {
            return Err(CoreError::MissingCredentials(missing.join(", ")));
        }

        let embedder = self.factory.embedder(&credentials);
        let index = Arc::new(VectorIndex::build(self.knowledge.chunks(), embedder)?);

        let analysis_chat = self
            .factory
            .chat(&credentials, config::ANALYSIS_TEMPERATURE);
        let expansion_chat = self
            .factory
            .chat(&credentials, config::EXPANSION_TEMPERATURE);
        let reranker = self.factory.reranker(&credentials);

        let requested = Strategy::parse(requested_strategy);
        let selection = strategy::select_retriever(
            requested,
            index,
            expansion_chat,
            reranker,
            config::DEFAULT_TOP_K,
        );
        let effective = selection.effective;

        let analyzer = Arc::new(IngredientAnalyzer::new(
            selection.retriever,
            analysis_chat,
            effective,
        ));

        *self.active.write().map_err(|_| CoreError::LockPoisoned)? = Some(analyzer);
        *self
            .credentials
            .write()
            .map_err(|_| CoreError::LockPoisoned)? = Some(credentials);

        tracing::info!(requested = %requested, effective = %effective, "pipeline configured");
        Ok(effective)
    }

    /// Clone of the current analyzer, or `NotInitialized` before the first
    /// successful configure.
    pub fn analyzer(&self) -> Result<Arc<IngredientAnalyzer>, CoreError> {
        self.active
            .read()
            .map_err(|_| CoreError::LockPoisoned)?
            .as_ref()
            .cloned()
            .ok_or(CoreError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.active.read().map(|a| a.is_some()).unwrap_or(false)
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .map(|c| c.is_some())
            .unwrap_or(false)
    }
}
