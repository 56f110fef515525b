use crate::core::slots::{SlotGraph, SlotPair};
use crate::error::Result;
use thiserror::Error;

/// Errors raised by an embedding oracle
///
/// These never abort a run; the affected attribute degrades to zero.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),
}

/// Text embedding oracle used for free-text attributes
pub trait EmbeddingProvider: Send + Sync {
    /// Encode a batch of texts, one vector per input, same order.
    /// Empty strings must be accepted.
    fn encode(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Human-readable provider name
    fn name(&self) -> &str;
}

/// Maximum-cardinality, maximum-weight bipartite matching over a slot graph
pub trait MatchingSolver: Send + Sync {
    /// Return the matched slot pairs. Every pair must be an edge of `graph`
    /// and no slot may appear twice.
    fn solve(&self, graph: &SlotGraph) -> Result<Vec<SlotPair>>;

    fn name(&self) -> &str;
}
