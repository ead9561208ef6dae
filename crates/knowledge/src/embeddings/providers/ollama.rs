//! Ollama embedding provider.
//!
//! Calls Ollama's `/api/embeddings` endpoint once per text. The default
//! model is `all-minilm` (all-MiniLM-L6-v2, 384 dimensions).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use studybuddy_core::config::EmbeddingConfig;
use studybuddy_core::{AppError, AppResult};
use tracing::{debug, instrument};

use crate::embeddings::EmbeddingProvider;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Build a provider from configuration. No request is made until the
    /// first embedding call.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| {
                AppError::IndexBuild(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::IndexBuild(format!(
                    "Embedding service unavailable at {}: {}",
                    self.base_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(AppError::IndexBuild(format!(
                "Ollama embedding error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::IndexBuild(format!("Failed to parse Ollama embedding response: {}", e))
        })?;

        self.check_dimensions(body.embedding)
    }

    fn check_dimensions(&self, embedding: Vec<f32>) -> AppResult<Vec<f32>> {
        if embedding.len() != self.dimensions {
            return Err(AppError::IndexBuild(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            // The endpoint rejects empty prompts
            if text.trim().is_empty() {
                debug!("Using zero vector for blank text at index {}", i);
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }
            embeddings.push(self.embed_single(text).await?);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OllamaProvider {
        OllamaProvider::new(&EmbeddingConfig {
            endpoint: Some("http://gpu-box:11434/".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_configuration() {
        let provider = provider();
        assert_eq!(provider.base_url, "http://gpu-box:11434");
        assert_eq!(provider.model_name(), "all-minilm");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(EmbeddingRequest {
            model: "all-minilm",
            prompt: "hello",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"model": "all-minilm", "prompt": "hello"}));
    }

    #[test]
    fn test_dimension_mismatch_is_index_error() {
        let result = provider().check_dimensions(vec![0.1; 768]);
        assert!(matches!(result, Err(AppError::IndexBuild(_))));
    }

    #[tokio::test]
    async fn test_blank_texts_need_no_server() {
        let embeddings = provider()
            .embed_batch(&["   ".to_string(), String::new()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 384));
    }
}
