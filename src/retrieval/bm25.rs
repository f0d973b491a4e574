//! Okapi BM25 lexical retriever over the knowledge-base chunks.

use std::collections::HashMap;

use regex::Regex;

use crate::retrieval::{Passage, RetrievalError, Retriever};

const K1: f32 = 1.2;
const B: f32 = 0.75;

struct ScoredDoc {
    content: String,
    term_counts: HashMap<String, usize>,
    len: usize,
}

/// Term statistics are computed once at build time; queries only tokenize
/// the question and walk the precomputed tables.
pub struct Bm25Retriever {
    docs: Vec<ScoredDoc>,
    doc_freq: HashMap<String, usize>,
    avg_len: f32,
    tokenizer: Regex,
    k: usize,
}

impl Bm25Retriever {
    pub fn new(chunks: &[String], k: usize) -> Self {
        // The pattern is a literal; new() cannot fail on it.
        #[allow(clippy::unwrap_used)]
        let tokenizer = Regex::new(r"[a-z0-9]+").unwrap();

        let mut docs = Vec::with_capacity(chunks.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for chunk in chunks {
            let tokens = tokenize(&tokenizer, chunk);
            let mut term_counts: HashMap<String, usize> = HashMap::new();
            for token in &tokens {
                *term_counts.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_counts.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            docs.push(ScoredDoc {
                content: chunk.clone(),
                len: tokens.len(),
                term_counts,
            });
        }

        let avg_len = if docs.is_empty() {
            0.0
        } else {
            docs.iter().map(|d| d.len as f32).sum::<f32>() / docs.len() as f32
        };

        Self {
            docs,
            doc_freq,
            avg_len,
            tokenizer,
            k,
        }
    }

    fn score(&self, doc: &ScoredDoc, query_terms: &[String]) -> f32 {
        let n = self.docs.len() as f32;
        let mut score = 0.0;
        for term in query_terms {
            let tf = match doc.term_counts.get(term) {
                Some(count) => *count as f32,
                None => continue,
            };
            let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
            let norm = K1 * (1.0 - B + B * doc.len as f32 / self.avg_len);
            score += idf * tf * (K1 + 1.0) / (tf + norm);
        }
        score
    }
}

impl Retriever for Bm25Retriever {
    fn query(&self, question: &str) -> Result<Vec<Passage>, RetrievalError> {
        let query_terms = tokenize(&self.tokenizer, question);

        let mut scored: Vec<Passage> = self
            .docs
            .iter()
            .map(|doc| Passage {
                content: doc.content.clone(),
                score: self.score(doc, &query_terms),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(self.k);
        Ok(scored)
    }
}

fn tokenize(tokenizer: &Regex, text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    tokenizer
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn exact_term_match_outranks_unrelated() {
        let retriever = Bm25Retriever::new(
            &corpus(&[
                "high-fructose corn syrup is an added sugar",
                "whole grain oats provide dietary fiber",
                "sodium benzoate is a chemical preservative",
            ]),
            3,
        );
        let results = retriever.query("corn syrup").unwrap();
        assert!(results[0].content.contains("corn syrup"));
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn rare_terms_weigh_more_than_common() {
        // "sugar" appears everywhere, "molasses" once; the molasses doc
        // must win a query mentioning both.
        let retriever = Bm25Retriever::new(
            &corpus(&[
                "sugar sugar sugar",
                "sugar and molasses",
                "sugar in cereals",
            ]),
            3,
        );
        let results = retriever.query("molasses sugar").unwrap();
        assert!(results[0].content.contains("molasses"));
    }

    #[test]
    fn ties_keep_corpus_order() {
        let retriever = Bm25Retriever::new(&corpus(&["honey oats", "honey oats"]), 2);
        let results = retriever.query("honey").unwrap();
        assert_eq!(results[0].content, results[1].content);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn respects_top_k() {
        let retriever = Bm25Retriever::new(
            &corpus(&["a sugar", "b sugar", "c sugar", "d sugar"]),
            2,
        );
        let results = retriever.query("sugar").unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn no_matching_terms_scores_zero() {
        let retriever = Bm25Retriever::new(&corpus(&["whole grain oats"]), 1);
        let results = retriever.query("xylitol").unwrap();
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn tokenizer_is_case_insensitive() {
        let retriever = Bm25Retriever::new(&corpus(&["Red 40 Artificial Color", "plain oats"]), 2);
        let results = retriever.query("RED 40").unwrap();
        assert!(results[0].content.contains("Red 40"));
        assert!(results[0].score > 0.0);
    }
}
