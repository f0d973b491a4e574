//! Query-expansion retriever: rewrites the question with the chat model,
//! queries the base retriever with every version, and deduplicates.

use std::collections::HashSet;
use std::sync::Arc;

use crate::llm::ChatModel;
use crate::retrieval::{Passage, RetrievalError, Retriever};

const EXPANSION_SYSTEM: &str = "You are an AI language model assistant. Your task is to generate \
3 different versions of the given user question to retrieve relevant documents from a vector \
database. By generating multiple perspectives on the user question, your goal is to help \
overcome some limitations of distance-based similarity search. Provide these alternative \
questions, one per line, with no numbering and no other text.";

pub struct MultiQueryRetriever {
    base: Arc<dyn Retriever>,
    chat: Arc<dyn ChatModel>,
}

impl MultiQueryRetriever {
    pub fn new(base: Arc<dyn Retriever>, chat: Arc<dyn ChatModel>) -> Self {
        Self { base, chat }
    }

    fn expand(&self, question: &str) -> Result<Vec<String>, RetrievalError> {
        let response = self
            .chat
            .generate(EXPANSION_SYSTEM, question)
            .map_err(|e| RetrievalError::QueryExpansion(e.to_string()))?;

        let variants: Vec<String> = response
            .lines()
            .map(|line| {
                // Strip "1." / "1)" / "-" prefixes in case the model numbers
                // its output anyway.
                line.trim()
                    .trim_start_matches(|c: char| c.is_ascii_digit())
                    .trim_start_matches(['.', ')', '-'])
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect();

        tracing::debug!(count = variants.len(), "expanded query");
        Ok(variants)
    }
}

impl Retriever for MultiQueryRetriever {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError> {
        // An empty expansion is not an error; the original question still
        // runs on its own.
        let variants = self.expand(question)?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<Passage> = Vec::new();

        for query in std::iter::once(question.to_string()).chain(variants) {
            for passage in self.base.query(&query)? {
                if seen.insert(passage.content.clone()) {
                    merged.push(passage);
                }
            }
        }

        Ok(merged)
    }
}
