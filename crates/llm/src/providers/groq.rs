//! Groq chat provider.
//!
//! Groq exposes an OpenAI-compatible chat completions API authenticated
//! with a bearer key.

use std::time::Duration;

use crate::client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde::{Deserialize, Serialize};
use studybuddy_core::{AppError, AppResult};

pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Groq LLM client.
pub struct GroqClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a client for the hosted Groq API.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_GROQ_URL, api_key, timeout_secs)
    }

    /// Create a client against a custom OpenAI-compatible base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> AppResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::MissingCredential(
                "Groq provider requires an API key".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn convert_response(response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AppError::ModelInvocation("Groq returned no completion choices".to_string())
        })?;

        Ok(LlmResponse {
            content: choice.message.content,
            model: response.model,
            usage,
        })
    }

    /// Pull the human-readable message out of an API error body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string())
    }
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, messages = request.messages.len(), "Sending chat request to Groq");

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ModelInvocation(format!("Failed to reach Groq: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ModelInvocation(format!(
                "Groq API error ({}): {}",
                status,
                Self::error_message(&error_text)
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ModelInvocation(format!("Failed to parse Groq response: {}", e))
        })?;

        let result = Self::convert_response(parsed)?;
        tracing::debug!(
            prompt_tokens = result.usage.prompt_tokens,
            completion_tokens = result.usage.completion_tokens,
            "Received completion from Groq"
        );

        Ok(result)
    }
}
