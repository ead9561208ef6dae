//! In-memory vector index.
//!
//! Exact search: every query is scored against every stored vector by
//! cosine similarity. An index is built once from a batch of chunks and is
//! never updated in place.

use std::cmp::Ordering;

use studybuddy_core::{AppError, AppResult};

use crate::chunk::Chunk;
use crate::embeddings::{embed_in_batches, EmbeddingProvider};
use crate::vector_index::{ScoredChunk, VectorIndex};

#[derive(Debug, Clone)]
struct Entry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Exact cosine-similarity index held in memory.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    dimensions: usize,
    entries: Vec<Entry>,
}

impl MemoryIndex {
    /// Pair chunks with their embeddings.
    pub fn from_embeddings(
        dimensions: usize,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> AppResult<Self> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::IndexBuild(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                if embedding.len() != dimensions {
                    return Err(AppError::IndexBuild(format!(
                        "Embedding for {} has {} dimensions, expected {}",
                        chunk.source_name,
                        embedding.len(),
                        dimensions
                    )));
                }
                Ok(Entry { chunk, embedding })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            dimensions,
            entries,
        })
    }
}

/// Embed `chunks` and build a fresh index from them.
///
/// The whole batch fails on the first embedding error; no partial index is
/// returned.
pub async fn build_index(
    chunks: Vec<Chunk>,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> AppResult<MemoryIndex> {
    if chunks.is_empty() {
        return Err(AppError::IndexBuild(
            "no text extracted from the uploaded documents".to_string(),
        ));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = embed_in_batches(provider, &texts, batch_size).await?;

    let index = MemoryIndex::from_embeddings(provider.dimensions(), chunks, embeddings)?;
    tracing::info!(
        chunks = index.len(),
        dimensions = index.dimensions(),
        "Built vector index"
    );

    Ok(index)
}

impl VectorIndex for MemoryIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Other(format!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_embedding, &e.embedding)))
            .collect();

        scored.sort_by(|a, b| by_score_desc(a.1, b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
                distance: 1.0 - score,
            })
            .collect())
    }
}

/// Highest score first; NaN sorts last.
fn by_score_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Cosine similarity; zero-length vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_name: "t.txt".to_string(),
            offset: 0,
            position: 0,
            page: None,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nan_sorts_last() {
        let mut scores = vec![0.2, f32::NAN, 0.9, -0.1];
        scores.sort_by(|a, b| by_score_desc(*a, *b));
        assert_eq!(&scores[..3], &[0.9, 0.2, -0.1]);
        assert!(scores[3].is_nan());
    }

    #[test]
    fn test_mismatched_lengths() {
        let result = MemoryIndex::from_embeddings(2, vec![chunk("a")], vec![]);
        assert!(matches!(result, Err(AppError::IndexBuild(_))));

        let result = MemoryIndex::from_embeddings(2, vec![chunk("a")], vec![vec![1.0]]);
        assert!(matches!(result, Err(AppError::IndexBuild(_))));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index =
            MemoryIndex::from_embeddings(2, vec![chunk("a")], vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_zero_k() {
        let index =
            MemoryIndex::from_embeddings(2, vec![chunk("a")], vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }
}
