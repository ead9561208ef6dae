//! Session state for one user conversation.
//!
//! A [`Session`] owns the active index, the chat history and the model
//! client. Every operation takes the session explicitly; rebuilding the
//! index or asking a question needs `&mut Session`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use studybuddy_core::{AppConfig, AppError, AppResult};
use studybuddy_llm::LlmClient;
use studybuddy_prompt::PromptSet;

use crate::chunk::{chunk_documents, ChunkerConfig};
use crate::embeddings::EmbeddingProvider;
use crate::index::build_index;
use crate::loader::{load_paths, LoadFailure};
use crate::rag::answer::{AnswerGenerator, GenerationInput};
use crate::rag::history::{ChatHistory, ConversationTurn, TurnRole};
use crate::rag::mode::RequestKind;
use crate::rag::types::{Answer, SourceRef};
use crate::retriever::Retriever;
use crate::vector_index::{ScoredChunk, VectorIndex};

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub chunker: ChunkerConfig,
    pub top_k: usize,
    pub history_window: usize,
    pub batch_size: usize,
    pub institution: String,
    pub prompts: PromptSet,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig, prompts: PromptSet) -> AppResult<Self> {
        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature(),
            chunker: ChunkerConfig::new(
                config.retrieval.chunk_size,
                config.retrieval.chunk_overlap,
            )?,
            top_k: config.retrieval.top_k,
            history_window: config.retrieval.history_window,
            batch_size: config.embedding.batch_size,
            institution: config.export.institution.clone(),
            prompts,
        })
    }
}

/// Summary of a successful index rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub files: Vec<String>,
    pub failures: Vec<LoadFailure>,
    pub documents: usize,
    pub chunks: usize,
    pub dimensions: usize,
}

pub struct Session {
    settings: SessionSettings,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Option<AnswerGenerator>,
    retriever: Option<Retriever>,
    history: ChatHistory,
    processed_files: Vec<String>,
    last_sources: Vec<SourceRef>,
}

impl Session {
    /// Start a session. Without an LLM client the session can still index
    /// documents, but `ask` fails with a missing-credential error.
    pub fn new(
        settings: SessionSettings,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let mut session = Self {
            settings,
            embedder,
            generator: None,
            retriever: None,
            history: ChatHistory::new(),
            processed_files: Vec::new(),
            last_sources: Vec::new(),
        };
        if let Some(llm) = llm {
            session.set_llm(llm);
        }
        session
    }

    /// Install or replace the model client.
    pub fn set_llm(&mut self, llm: Arc<dyn LlmClient>) {
        tracing::debug!(provider = llm.provider_name(), "Model client configured");
        self.generator = Some(AnswerGenerator::new(
            llm,
            self.settings.model.clone(),
            self.settings.temperature,
            self.settings.prompts.clone(),
            self.settings.institution.clone(),
        ));
    }

    pub fn has_llm(&self) -> bool {
        self.generator.is_some()
    }

    pub fn has_index(&self) -> bool {
        self.retriever.is_some()
    }

    /// Number of chunks in the active index.
    pub fn index_len(&self) -> usize {
        self.retriever.as_ref().map(Retriever::len).unwrap_or(0)
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.history.turns()
    }

    pub fn processed_files(&self) -> &[String] {
        &self.processed_files
    }

    /// Sources used by the most recent answer.
    pub fn last_sources(&self) -> &[SourceRef] {
        &self.last_sources
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
        self.last_sources.clear();
    }

    /// Load, chunk and embed `paths`, then replace the active index.
    ///
    /// Unreadable files are reported in the result and skipped. If nothing
    /// can be indexed, or embedding fails, the previous index stays
    /// installed and an `IndexBuild` error is returned.
    pub async fn process_documents(&mut self, paths: &[PathBuf]) -> AppResult<IndexReport> {
        tracing::info!(paths = paths.len(), "Processing documents");

        let load = load_paths(paths);
        let chunks = chunk_documents(&load.documents, &self.settings.chunker)?;

        if chunks.is_empty() {
            return Err(AppError::IndexBuild(no_text_message(paths.len(), &load.failures)));
        }

        let chunk_count = chunks.len();
        let index = build_index(chunks, self.embedder.as_ref(), self.settings.batch_size).await?;

        let report = IndexReport {
            files: load.loaded_files.clone(),
            failures: load.failures,
            documents: load.documents.len(),
            chunks: chunk_count,
            dimensions: index.dimensions(),
        };

        self.retriever = Some(Retriever::new(
            Box::new(index),
            Arc::clone(&self.embedder),
            self.settings.top_k,
        ));
        self.processed_files = load.loaded_files;

        tracing::info!(
            files = report.files.len(),
            failures = report.failures.len(),
            chunks = report.chunks,
            "Index replaced"
        );

        Ok(report)
    }

    /// Answer one request and record the exchange in the history.
    ///
    /// Model and retrieval failures do not return `Err`: they come back as
    /// an [`Answer`] with `error` set, and `Error: ...` is recorded as the
    /// assistant turn. The only error is a missing model client, in which
    /// case nothing is recorded.
    pub async fn ask(&mut self, question: &str) -> AppResult<Answer> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            AppError::MissingCredential(
                "No API key configured. Provide one before asking questions.".to_string(),
            )
        })?;

        let kind = RequestKind::classify(question);
        let history = self.history.render_recent(self.settings.history_window);

        tracing::info!(kind = ?kind, indexed = self.retriever.is_some(), "Answering request");

        let (outcome, retrieved) =
            answer_once(generator, self.retriever.as_ref(), kind, question, &history).await;
        let sources: Vec<SourceRef> = retrieved.iter().map(SourceRef::from).collect();

        self.history.push(TurnRole::User, question);

        let answer = match outcome {
            Ok(text) => {
                self.history.push(TurnRole::Assistant, text.clone());
                Answer {
                    kind,
                    text,
                    sources,
                    error: None,
                }
            }
            Err(err) => {
                tracing::error!("Request failed: {}", err);
                let message = err.to_string();
                let text = format!("Error: {}", message);
                self.history.push(TurnRole::Assistant, text.clone());
                Answer {
                    kind,
                    text,
                    sources,
                    error: Some(message),
                }
            }
        };

        self.last_sources = answer.sources.clone();
        Ok(answer)
    }
}

async fn answer_once(
    generator: &AnswerGenerator,
    retriever: Option<&Retriever>,
    kind: RequestKind,
    question: &str,
    history: &str,
) -> (AppResult<String>, Vec<ScoredChunk>) {
    let retrieved = match retriever {
        Some(retriever) => match retriever.retrieve(question).await {
            Ok(chunks) => Some(chunks),
            Err(e) => return (Err(e), Vec::new()),
        },
        None => None,
    };

    let input = GenerationInput {
        kind,
        question,
        retrieved: retrieved.as_deref(),
        history,
    };
    let outcome = generator.generate(&input).await;

    (outcome, retrieved.unwrap_or_default())
}

fn no_text_message(path_count: usize, failures: &[LoadFailure]) -> String {
    let mut message = format!("no text extracted from {} path(s)", path_count);
    if !failures.is_empty() {
        let details: Vec<String> = failures
            .iter()
            .map(|f| format!("{} ({})", f.source_name, f.message))
            .collect();
        message.push_str(&format!("; failed: {}", details.join(", ")));
    }
    message
}
