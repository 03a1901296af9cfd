//! NVIDIA NIM retrieval microservice clients: embeddings and reranking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::relevance::RelevanceModel;

/// The default NVIDIA integrate endpoint for embeddings.
const NVIDIA_EMBEDDINGS_URL: &str = "https://integrate.api.nvidia.com/v1/embeddings";

/// The default NVIDIA retrieval endpoint for reranking.
const NVIDIA_RERANKING_URL: &str =
    "https://ai.api.nvidia.com/v1/retrieval/nvidia/nv-rerankqa-mistral-4b-v3/reranking";

/// The default embedding model and its output dimensionality.
const DEFAULT_EMBED_MODEL: &str = "nvidia/nv-embedqa-e5-v5";
const DEFAULT_EMBED_DIMENSIONS: usize = 1024;

/// The default reranking model.
const DEFAULT_RERANK_MODEL: &str = "nvidia/nv-rerankqa-mistral-4b-v3";

/// How an embedded text will be used; retrieval models embed queries and
/// passages asymmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Embedding a search query.
    Query,
    /// Embedding a document passage for indexing.
    Passage,
}

/// An [`Embedder`] backed by an NVIDIA NIM embeddings endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use alfred_rag::nim::{InputType, NimEmbedder};
///
/// let embedder = NimEmbedder::new("nvapi-...")?.with_input_type(InputType::Query);
/// let vector = embedder.embed("what is the warranty period?").await?;
/// ```
pub struct NimEmbedder {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    input_type: InputType,
    dimensions: usize,
}

impl NimEmbedder {
    /// Create a new embedder with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "NIM".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            url: NVIDIA_EMBEDDINGS_URL.into(),
            model: DEFAULT_EMBED_MODEL.into(),
            input_type: InputType::Query,
            dimensions: DEFAULT_EMBED_DIMENSIONS,
        })
    }

    /// Create a new embedder using the `NVIDIA_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NVIDIA_API_KEY").map_err(|_| RagError::Embedding {
            provider: "NIM".into(),
            message: "NVIDIA_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the endpoint URL (for self-hosted NIMs).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set how embedded texts will be used (query vs. passage).
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    input_type: InputType,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for NimEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Empty input signals "no embedding" downstream.
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "NIM".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "NIM",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            input_type: self.input_type,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "NIM", error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: "NIM".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "NIM", %status, "embedding API error");
            return Err(RagError::Embedding {
                provider: "NIM".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "NIM", error = %e, "failed to parse embedding response");
            RagError::Embedding {
                provider: "NIM".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`RelevanceModel`] backed by an NVIDIA NIM reranking endpoint.
///
/// The endpoint scores each passage against the query with a cross-encoder
/// and returns per-passage logits; logits are comparable but unbounded,
/// which is all the pipeline requires.
pub struct NimReranker {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
}

impl NimReranker {
    /// Create a new reranker with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Rerank("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            url: NVIDIA_RERANKING_URL.into(),
            model: DEFAULT_RERANK_MODEL.into(),
        })
    }

    /// Create a new reranker using the `NVIDIA_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NVIDIA_API_KEY").map_err(|_| {
            RagError::Rerank("NVIDIA_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the reranking model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint URL (for self-hosted NIMs).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: RerankText<'a>,
    passages: Vec<RerankText<'a>>,
}

#[derive(Serialize)]
struct RerankText<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RerankResponse {
    rankings: Vec<Ranking>,
}

#[derive(Deserialize)]
struct Ranking {
    index: usize,
    logit: f32,
}

#[async_trait]
impl RelevanceModel for NimReranker {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "NIM",
            model = %self.model,
            passage_count = passages.len(),
            "reranking request"
        );

        let request_body = RerankRequest {
            model: &self.model,
            query: RerankText { text: query },
            passages: passages.iter().map(|p| RerankText { text: p }).collect(),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "NIM", error = %e, "rerank request failed");
                RagError::Rerank(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "NIM", %status, "rerank API error");
            return Err(RagError::Rerank(format!("API returned {status}: {detail}")));
        }

        let parsed: RerankResponse = response.json().await.map_err(|e| {
            error!(provider = "NIM", error = %e, "failed to parse rerank response");
            RagError::Rerank(format!("failed to parse response: {e}"))
        })?;

        // Rankings come back best-first; re-key them to input order.
        let mut scores = vec![0.0f32; passages.len()];
        for ranking in parsed.rankings {
            if let Some(slot) = scores.get_mut(ranking.index) {
                *slot = ranking.logit;
            }
        }
        Ok(scores)
    }
}
