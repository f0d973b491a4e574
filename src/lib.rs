pub mod api; // HTTP surface: cereals / configure / analyze / status
pub mod catalog; // Cereal listing from the flat CSV file
pub mod config;
pub mod core_state; // Shared state: credentials + swappable analyzer slot
pub mod embeddings;
pub mod evaluation; // Golden-dataset quality scoring for the pipeline
pub mod knowledge; // Knowledge-base loading and chunking
pub mod llm;
pub mod pipeline; // Retrieve-then-analyze analysis workflow
pub mod retrieval; // Retriever capability, strategies, selector
