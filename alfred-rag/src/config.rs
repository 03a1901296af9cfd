//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// How many related queries expansion asks for.
    pub expansion_queries: usize,
    /// Per-query result cap when retrieving for expanded queries.
    pub fanout_limit: usize,
    /// Result cap for direct single-query retrieval.
    pub direct_limit: usize,
    /// How many top-ranked chunks the context window holds.
    pub context_docs: usize,
    /// Minimum top relevance score; retrieval below this is rejected whole.
    pub score_threshold: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            expansion_queries: 3,
            fanout_limit: 10,
            direct_limit: 25,
            context_docs: 5,
            score_threshold: 0.5,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set how many related queries expansion asks for.
    pub fn expansion_queries(mut self, count: usize) -> Self {
        self.config.expansion_queries = count;
        self
    }

    /// Set the per-query result cap for expansion fan-out retrieval.
    pub fn fanout_limit(mut self, limit: usize) -> Self {
        self.config.fanout_limit = limit;
        self
    }

    /// Set the result cap for direct single-query retrieval.
    pub fn direct_limit(mut self, limit: usize) -> Self {
        self.config.direct_limit = limit;
        self
    }

    /// Set how many top-ranked chunks the context window holds.
    pub fn context_docs(mut self, count: usize) -> Self {
        self.config.context_docs = count;
        self
    }

    /// Set the confidence gate threshold.
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.config.score_threshold = threshold;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any of `expansion_queries`,
    /// `fanout_limit`, `direct_limit`, or `context_docs` is zero.
    pub fn build(self) -> Result<RagConfig> {
        if self.config.expansion_queries == 0 {
            return Err(RagError::Config("expansion_queries must be greater than zero".into()));
        }
        if self.config.fanout_limit == 0 || self.config.direct_limit == 0 {
            return Err(RagError::Config("retrieval limits must be greater than zero".into()));
        }
        if self.config.context_docs == 0 {
            return Err(RagError::Config("context_docs must be greater than zero".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_targets() {
        let config = RagConfig::default();
        assert_eq!(config.expansion_queries, 3);
        assert_eq!(config.fanout_limit, 10);
        assert_eq!(config.direct_limit, 25);
        assert_eq!(config.context_docs, 5);
        assert!((config.score_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_rejects_zero_limits() {
        assert!(RagConfig::builder().fanout_limit(0).build().is_err());
        assert!(RagConfig::builder().context_docs(0).build().is_err());
        assert!(RagConfig::builder().expansion_queries(0).build().is_err());
        assert!(RagConfig::builder().direct_limit(5).build().is_ok());
    }
}
