//! Offline evaluation runner: builds the live pipeline from environment
//! credentials and scores it against the golden dataset.
//!
//! Required: OPENAI_API_KEY. Optional: COHERE_API_KEY (enables the
//! compression strategy) and KIDSAFE_STRATEGY (defaults to ensemble).

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use kidsafe::config;
use kidsafe::core_state::{Credentials, OpenAiProviderFactory, ProviderFactory};
use kidsafe::evaluation;
use kidsafe::knowledge::KnowledgeBase;
use kidsafe::pipeline::analyzer::IngredientAnalyzer;
use kidsafe::retrieval::index::VectorIndex;
use kidsafe::retrieval::strategy::{self, Strategy};

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "evaluation failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials {
        openai_api_key: std::env::var("OPENAI_API_KEY")
            .map_err(|_| "OPENAI_API_KEY is not set")?,
        langsmith_api_key: std::env::var("LANGSMITH_API_KEY").unwrap_or_default(),
        cohere_api_key: std::env::var("COHERE_API_KEY").ok(),
        tavily_api_key: None,
    };
    let requested = std::env::var("KIDSAFE_STRATEGY").unwrap_or_else(|_| "ensemble".to_string());

    let knowledge = KnowledgeBase::load(&config::knowledge_path())?;

    let factory = OpenAiProviderFactory;
    let embedder = factory.embedder(&credentials);
    let index = Arc::new(VectorIndex::build(knowledge.chunks(), embedder)?);
    let analysis_chat = factory.chat(&credentials, config::ANALYSIS_TEMPERATURE);
    let expansion_chat = factory.chat(&credentials, config::EXPANSION_TEMPERATURE);
    let reranker = factory.reranker(&credentials);

    let selection = strategy::select_retriever(
        Strategy::parse(&requested),
        index,
        expansion_chat,
        reranker,
        config::DEFAULT_TOP_K,
    );
    tracing::info!(strategy = %selection.effective, "pipeline assembled");

    let analyzer = IngredientAnalyzer::new(
        Arc::clone(&selection.retriever),
        analysis_chat,
        selection.effective,
    );

    let report = evaluation::evaluate(&analyzer, selection.retriever.as_ref())?;

    println!();
    println!(
        "{:<28} {:>10} {:>10} {:>15} {:>13}",
        "cereal", "expected", "actual", "context_recall", "topic_recall"
    );
    for score in &report.scores {
        println!(
            "{:<28} {:>10} {:>10} {:>15.2} {:>13.2}",
            score.cereal_name,
            format!("{:?}", score.expected),
            format!("{:?}", score.actual),
            score.context_recall,
            score.topic_recall,
        );
    }
    println!();
    println!("verdict accuracy     {:.3}", report.verdict_accuracy());
    println!("mean context recall  {:.3}", report.mean_context_recall());
    println!("mean topic recall    {:.3}", report.mean_topic_recall());

    Ok(())
}
