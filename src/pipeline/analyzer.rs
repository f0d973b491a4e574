//! The two-stage analysis pipeline: retrieve guidelines, then generate a
//! verdict-led analysis.

use std::sync::Arc;

use serde::Serialize;

use crate::config;
use crate::llm::ChatModel;
use crate::pipeline::prompt;
use crate::pipeline::verdict::Verdict;
use crate::pipeline::AnalysisError;
use crate::retrieval::{Passage, Retriever};
use crate::retrieval::strategy::Strategy;

/// Accumulates one request's data as it flows through the stages. Each
/// stage writes exactly one field and reads only what earlier stages wrote.
struct AnalysisState {
    cereal_name: String,
    ingredients: String,
    question: String,
    context: Vec<Passage>,
    analysis: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub verdict: Verdict,
    pub analysis: String,
}

/// Immutable after construction; one instance serves all requests until a
/// reconfigure swaps in a replacement.
pub struct IngredientAnalyzer {
    retriever: Arc<dyn Retriever>,
    chat: Arc<dyn ChatModel>,
    strategy: Strategy,
}

impl std::fmt::Debug for IngredientAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngredientAnalyzer")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl IngredientAnalyzer {
    pub fn new(retriever: Arc<dyn Retriever>, chat: Arc<dyn ChatModel>, strategy: Strategy) -> Self {
        Self {
            retriever,
            chat,
            strategy,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Run the full pipeline. Input validation happens before any
    /// downstream call; stage errors propagate without retries or partial
    /// results.
    pub fn analyze(
        &self,
        cereal_name: &str,
        ingredients: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        if cereal_name.trim().is_empty() {
            return Err(AnalysisError::MissingField("cereal_name"));
        }
        if ingredients.trim().is_empty() {
            return Err(AnalysisError::MissingField("ingredients"));
        }

        tracing::info!(
            cereal = cereal_name,
            strategy = %self.strategy,
            project = config::TRACING_PROJECT,
            "analyzing ingredients"
        );

        let mut state = AnalysisState {
            cereal_name: cereal_name.to_string(),
            ingredients: ingredients.to_string(),
            question: prompt::synthesize_question(ingredients),
            context: Vec::new(),
            analysis: String::new(),
        };

        self.retrieve(&mut state)?;
        self.generate(&mut state)?;

        let verdict = Verdict::parse(&state.analysis).ok_or(AnalysisError::MissingVerdict)?;

        tracing::info!(cereal = cereal_name, verdict = ?verdict, "analysis complete");
        Ok(AnalysisReport {
            verdict,
            analysis: state.analysis,
        })
    }

    fn retrieve(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        state.context = self.retriever.query(&state.question)?;
        tracing::debug!(passages = state.context.len(), "retrieved context");
        Ok(())
    }

    fn generate(&self, state: &mut AnalysisState) -> Result<(), AnalysisError> {
        let user_prompt = prompt::build_analysis_prompt(
            &state.cereal_name,
            &state.ingredients,
            &state.question,
            &state.context,
        );
        state.analysis = self
            .chat
            .generate(prompt::ANALYSIS_SYSTEM_PROMPT, &user_prompt)?;
        Ok(())
    }
}
