//! Query-time retrieval over a built index.

use std::sync::Arc;

use studybuddy_core::{AppError, AppResult};

use crate::embeddings::EmbeddingProvider;
use crate::vector_index::{ScoredChunk, VectorIndex};

/// Embeds a query and returns the nearest chunks.
///
/// No relevance threshold is applied: a non-empty index always yields
/// `min(top_k, len)` results.
pub struct Retriever {
    index: Box<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        index: Box<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Retrieve with the configured K.
    pub async fn retrieve(&self, query: &str) -> AppResult<Vec<ScoredChunk>> {
        self.retrieve_k(query, self.top_k).await
    }

    /// Retrieve the `k` nearest chunks, nearest first.
    pub async fn retrieve_k(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(retrieval_error)?;
        let results = self.index.search(&query_embedding, k)?;

        tracing::debug!(
            requested = k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "Retrieved chunks"
        );

        Ok(results)
    }
}

/// Query embedding runs per question, so its failures are retrieval
/// failures even when the provider reports them as index errors.
fn retrieval_error(err: AppError) -> AppError {
    let detail = match err {
        AppError::IndexBuild(message) | AppError::Other(message) => message,
        other => other.to_string(),
    };
    AppError::Other(format!("Retrieval failed: {}", detail))
}
