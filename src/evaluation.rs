//! Offline quality evaluation: a golden dataset of real cereal ingredient
//! lists run through the full pipeline, scored on verdict agreement plus
//! how well the expected topics show up in the retrieved context and in
//! the generated analysis. Deterministic by construction, so it works the
//! same against the live providers (see the `evaluate` binary) and against
//! mocks.

use crate::pipeline::analyzer::IngredientAnalyzer;
use crate::pipeline::prompt;
use crate::pipeline::verdict::Verdict;
use crate::pipeline::AnalysisError;
use crate::retrieval::Retriever;

/// One golden test case: a real product, its label, the verdict the
/// classification rules demand, and topics a grounded analysis must
/// surface.
pub struct GoldenCase {
    pub cereal_name: &'static str,
    pub ingredients: &'static str,
    pub expected_verdict: Verdict,
    pub expected_topics: &'static [&'static str],
}

/// Real cereals spanning the three verdict classes. Expected verdicts
/// follow the precedence rules: any added sugar caps at MODERATE even
/// when preservatives or colors are also present.
pub fn golden_dataset() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            cereal_name: "Seven Sundays Cereal",
            ingredients: "Sorghum Flakes, Almonds, Coconut Sugar, Salt",
            expected_verdict: Verdict::Moderate,
            expected_topics: &["sugar"],
        },
        GoldenCase {
            cereal_name: "Holy Crap Organic Cereal",
            ingredients: "Organic Chia Seeds, Organic Buckwheat Kernels, Organic Hulled Hemp Seeds",
            expected_verdict: Verdict::Good,
            expected_topics: &["fiber"],
        },
        GoldenCase {
            cereal_name: "Post Honey Bunch Oats",
            ingredients: "Corn, Whole Grain Wheat, Sugar, Whole Grain Rolled Oats, Almonds, \
Rice, Canola Oil, Corn Syrup, Dried Bananas, Salt, Barley Malt Extract, Molasses, Cinnamon, \
Honey, Caramel Color, Natural Flavor, BHT Added To Preserve Freshness",
            expected_verdict: Verdict::Moderate,
            expected_topics: &["corn syrup", "bht"],
        },
        GoldenCase {
            cereal_name: "RX Cereal",
            ingredients: "Brown Rice, Almonds, Whole Grain Sorghum, Coconut Sugar, Pea Protein, \
Honey, Cocoa, Chocolate, Salt, Natural Flavors, Rosemary Extract",
            expected_verdict: Verdict::Moderate,
            expected_topics: &["honey", "natural flavor"],
        },
    ]
}

#[derive(Debug)]
pub struct CaseScore {
    pub cereal_name: &'static str,
    pub expected: Verdict,
    pub actual: Verdict,
    /// Fraction of expected topics present in the retrieved passages.
    pub context_recall: f32,
    /// Fraction of expected topics the analysis text mentions.
    pub topic_recall: f32,
}

impl CaseScore {
    pub fn verdict_match(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug)]
pub struct EvaluationReport {
    pub scores: Vec<CaseScore>,
}

impl EvaluationReport {
    pub fn verdict_accuracy(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let hits = self.scores.iter().filter(|s| s.verdict_match()).count();
        hits as f32 / self.scores.len() as f32
    }

    pub fn mean_context_recall(&self) -> f32 {
        mean(self.scores.iter().map(|s| s.context_recall))
    }

    pub fn mean_topic_recall(&self) -> f32 {
        mean(self.scores.iter().map(|s| s.topic_recall))
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let collected: Vec<f32> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().sum::<f32>() / collected.len() as f32
}

fn topic_hits(topics: &[&str], text: &str) -> f32 {
    if topics.is_empty() {
        return 1.0;
    }
    let text = text.to_lowercase();
    let hits = topics
        .iter()
        .filter(|topic| text.contains(&topic.to_lowercase()))
        .count();
    hits as f32 / topics.len() as f32
}

/// Run every golden case through the retriever and the analyzer. The
/// retriever is queried separately with the same synthesized question the
/// analyzer uses, so context recall reflects what the pipeline saw.
pub fn evaluate(
    analyzer: &IngredientAnalyzer,
    retriever: &dyn Retriever,
) -> Result<EvaluationReport, AnalysisError> {
    let mut scores = Vec::new();

    for case in golden_dataset() {
        tracing::info!(cereal = case.cereal_name, "evaluating");

        let question = prompt::synthesize_question(case.ingredients);
        let context = retriever.query(&question)?;
        let context_text = context
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let report = analyzer.analyze(case.cereal_name, case.ingredients)?;

        scores.push(CaseScore {
            cereal_name: case.cereal_name,
            expected: case.expected_verdict,
            actual: report.verdict,
            context_recall: topic_hits(case.expected_topics, &context_text),
            topic_recall: topic_hits(case.expected_topics, &report.analysis),
        });
    }

    Ok(EvaluationReport { scores })
}
