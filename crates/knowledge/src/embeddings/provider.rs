//! Embedding provider trait and factory.

use std::sync::Arc;

use studybuddy_core::config::EmbeddingConfig;
use studybuddy_core::{AppError, AppResult};

use super::providers::{HashedProvider, OllamaProvider};

/// Trait for embedding providers.
///
/// The same text and model must always map to the same vector.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "hashed")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::IndexBuild("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Config(
            "embedding dimensions must be at least 1".to_string(),
        ));
    }

    match config.provider.as_str() {
        "hashed" => Ok(Arc::new(HashedProvider::new(config.dimensions))),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, hashed",
            other
        ))),
    }
}
