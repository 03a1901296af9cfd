//! Relevance model trait for cross-encoder style scoring.

use async_trait::async_trait;

use crate::error::Result;

/// A model that scores (query, passage) pairs for relevance.
///
/// More precise than the initial vector similarity; used to reorder
/// candidates after retrieval. Scores are comparable real numbers, higher
/// is more relevant, and are not guaranteed to fall in any fixed range.
#[async_trait]
pub trait RelevanceModel: Send + Sync {
    /// Score each passage against the query; one score per passage, in
    /// input order.
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>>;
}
