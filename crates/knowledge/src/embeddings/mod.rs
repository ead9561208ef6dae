//! Embedding providers.
//!
//! Maps chunk text to fixed-length vectors through a provider chosen in
//! configuration.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use studybuddy_core::{AppError, AppResult};

/// Embed `texts` in batches of at most `batch_size`.
///
/// Fails unless exactly one vector of the provider's dimension comes back
/// per text.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let mut embeddings = Vec::with_capacity(texts.len());

    tracing::info!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = provider.embed_batch(batch).await.map_err(|e| match e {
            AppError::IndexBuild(_) => e,
            other => AppError::IndexBuild(other.to_string()),
        })?;

        if vectors.len() != batch.len() {
            return Err(AppError::IndexBuild(format!(
                "Embedding batch {} returned {} vectors for {} texts",
                batch_no,
                vectors.len(),
                batch.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != provider.dimensions()) {
            return Err(AppError::IndexBuild(format!(
                "Embedding has {} dimensions, expected {}",
                bad.len(),
                provider.dimensions()
            )));
        }

        tracing::debug!("Embedded batch {} ({} texts)", batch_no, batch.len());
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::HashedProvider;

    #[tokio::test]
    async fn test_embed_in_batches() {
        let provider = HashedProvider::new(64);
        let texts: Vec<String> = (0..70).map(|i| format!("text number {}", i)).collect();

        let embeddings = embed_in_batches(&provider, &texts, 32).await.unwrap();
        assert_eq!(embeddings.len(), 70);
        assert!(embeddings.iter().all(|e| e.len() == 64));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let provider = HashedProvider::new(8);
        let embeddings = embed_in_batches(&provider, &[], 32).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
