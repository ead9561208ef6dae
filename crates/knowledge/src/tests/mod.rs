//! Crate-level tests and shared test doubles.

mod session_flow;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use studybuddy_core::{AppError, AppResult};
use studybuddy_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

use crate::embeddings::providers::HashedProvider;
use crate::embeddings::EmbeddingProvider;

/// LLM double that replays scripted replies and records every request.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<AppResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the single user message of the last request.
    pub fn last_prompt(&self) -> String {
        self.requests()
            .last()
            .and_then(|r| r.last_user_message().map(str::to_string))
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))?;

        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Hashing embedder that can be switched into a failing state.
#[derive(Debug)]
pub struct SwitchableEmbedder {
    inner: HashedProvider,
    failing: AtomicBool,
}

impl SwitchableEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: HashedProvider::new(384),
            failing: AtomicBool::new(false),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for SwitchableEmbedder {
    fn provider_name(&self) -> &str {
        "switchable"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::IndexBuild("embedding service down".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}
