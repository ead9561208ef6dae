//! Vector index abstraction for chunks.

use serde::Serialize;
use studybuddy_core::AppResult;

use crate::chunk::Chunk;

/// A chunk returned by a similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query
    pub score: f32,
    /// `1 - score`
    pub distance: f32,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Length of every stored vector.
    fn dimensions(&self) -> usize;

    /// Number of stored chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for the `top_k` chunks nearest to `query_embedding`.
    ///
    /// Returns `min(top_k, len)` results ordered by non-decreasing distance.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;
}
