//! LLM provider factory.
//!
//! Resolves a provider name to a concrete client. Credential lookup
//! happens upstream in configuration; the factory only checks that a key
//! is present for providers that need one.

use crate::client::LlmClient;
use crate::providers::{groq, GroqClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use studybuddy_core::{AppError, AppResult};

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key for providers that require it
/// * `timeout_secs` - Per-request timeout
///
/// # Errors
/// - `AppError::MissingCredential` if the provider needs a key and none is given
/// - `AppError::Llm` if the provider is unknown or the HTTP client cannot be built
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Llm(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Groq => {
            let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::MissingCredential("Groq provider requires an API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(groq::DEFAULT_GROQ_URL);
            Ok(Arc::new(GroqClient::with_base_url(base_url, key, timeout_secs)?))
        }
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(crate::providers::ollama::DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::with_base_url(base_url, timeout_secs)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, 30).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None, 30);
        assert!(client.is_ok());
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None, 30) {
            Err(AppError::MissingCredential(msg)) => assert!(msg.contains("Groq")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("gsk_test"), 30).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, 30) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
