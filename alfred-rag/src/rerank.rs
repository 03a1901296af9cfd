//! Applying the relevance model to a candidate set.

use serde_json::json;

use crate::document::{DocChunk, ScoredChunk};
use crate::error::{RagError, Result};
use crate::relevance::RelevanceModel;

/// Score candidates against the query and sort them best-first.
///
/// An empty candidate set returns empty without invoking the model. Each
/// chunk's score is written into its `relevance_score` metadata field. The
/// sort is stable and descending: candidates with equal scores keep their
/// insertion order.
pub async fn rerank(
    model: &dyn RelevanceModel,
    query: &str,
    candidates: Vec<DocChunk>,
) -> Result<Vec<ScoredChunk>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
    let scores = model.score(query, &texts).await?;
    if scores.len() != candidates.len() {
        return Err(RagError::Rerank(format!(
            "model returned {} scores for {} candidates",
            scores.len(),
            candidates.len()
        )));
    }

    let mut ranked: Vec<ScoredChunk> = candidates
        .into_iter()
        .zip(scores)
        .map(|(mut chunk, score)| {
            chunk.metadata.insert("relevance_score".to_string(), json!(score));
            ScoredChunk { chunk, score }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed score vector and counts invocations.
    struct FixedScores {
        scores: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedScores {
        fn new(scores: Vec<f32>) -> Self {
            Self { scores, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl RelevanceModel for FixedScores {
        async fn score(&self, _query: &str, passages: &[&str]) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.iter().copied().take(passages.len()).collect())
        }
    }

    fn chunks(texts: &[&str]) -> Vec<DocChunk> {
        texts.iter().map(|t| DocChunk::with_source(*t, "s")).collect()
    }

    #[tokio::test]
    async fn empty_input_short_circuits_without_model_call() {
        let model = FixedScores::new(vec![]);
        let ranked = rerank(&model, "q", Vec::new()).await.unwrap();
        assert!(ranked.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sorts_descending_and_mirrors_score_into_metadata() {
        let model = FixedScores::new(vec![0.2, 0.9, 0.5]);
        let ranked = rerank(&model, "q", chunks(&["a", "b", "c"])).await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!((ranked[0].score - 0.9).abs() < 1e-6);
        assert_eq!(
            ranked[0].chunk.metadata["relevance_score"].as_f64().unwrap() as f32,
            0.9
        );
    }

    #[tokio::test]
    async fn equal_scores_keep_insertion_order() {
        let model = FixedScores::new(vec![0.7, 0.7, 0.7]);
        let ranked = rerank(&model, "q", chunks(&["first", "second", "third"])).await.unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn score_count_mismatch_is_an_error() {
        let model = FixedScores::new(vec![0.5]);
        // FixedScores takes passages.len() scores, so force a mismatch by
        // scripting fewer scores than candidates.
        let result = rerank(&model, "q", chunks(&["a", "b"])).await;
        assert!(matches!(result, Err(RagError::Rerank(_))));
    }
}
