use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "KidSafe";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the analysis API listens on.
pub const DEFAULT_PORT: u16 = 5001;

/// Chat model used for ingredient analysis and query expansion.
pub const CHAT_MODEL: &str = "gpt-4o-mini";

/// Embedding model backing the vector index.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_DIMENSION: usize = 1536;

/// Cohere model used by the compression (rerank) strategy.
pub const RERANK_MODEL: &str = "rerank-english-v3.0";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const COHERE_BASE_URL: &str = "https://api.cohere.com";

/// Lowered temperature for consistent, policy-like classification.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
/// Default temperature for multi-query expansion.
pub const EXPANSION_TEMPERATURE: f32 = 0.7;

/// Passages retrieved per analysis.
pub const DEFAULT_TOP_K: usize = 5;

/// Knowledge-base chunking parameters.
pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// Project label attached to generated questions for trace grouping.
pub const TRACING_PROJECT: &str = "kidsafe-food-analyzer";

/// Get the data directory holding the knowledge base and cereal list.
/// Defaults to `./data`, overridable via `KIDSAFE_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    std::env::var_os("KIDSAFE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Path to the food-labeling guide text.
pub fn knowledge_path() -> PathBuf {
    data_dir().join("food_labeling_guide.md")
}

/// Path to the cereal listing CSV.
pub fn cereal_csv_path() -> PathBuf {
    data_dir().join("cereal.csv")
}

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,kidsafe=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_path_under_data_dir() {
        let path = knowledge_path();
        assert!(path.starts_with(data_dir()));
        assert!(path.ends_with("food_labeling_guide.md"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn retrieval_defaults_are_sane() {
        assert!(DEFAULT_TOP_K > 0);
        assert!(CHUNK_OVERLAP < CHUNK_SIZE);
        assert!(ANALYSIS_TEMPERATURE < EXPANSION_TEMPERATURE);
    }
}
