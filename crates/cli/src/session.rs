//! Shared session setup and output helpers for the commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use studybuddy_core::{config::AppConfig, ApiKey, AppError, AppResult};
use studybuddy_export::{export_question_paper, ExportHeader};
use studybuddy_knowledge::{
    create_provider, Answer, EmbeddingProvider, IndexReport, RequestKind, Session, SessionSettings,
};
use studybuddy_llm::{create_client, LlmClient};
use studybuddy_prompt::PromptSet;

/// Build a session from configuration.
///
/// A missing API key is not an error here: the session can still index
/// documents and will refuse to answer until a key is supplied.
pub fn open_session(config: &AppConfig, top_k: Option<usize>) -> AppResult<Session> {
    config.validate()?;

    let prompts = PromptSet::load(&config.workspace)?;
    let mut settings = SessionSettings::from_config(config, prompts)?;
    if let Some(k) = top_k {
        if k == 0 {
            return Err(AppError::Config("--top-k must be at least 1".to_string()));
        }
        settings.top_k = k;
    }

    let embedder = create_provider(&config.embedding)?;
    tracing::debug!(
        provider = embedder.provider_name(),
        model = embedder.model_name(),
        dimensions = embedder.dimensions(),
        "Embedding provider ready"
    );

    Ok(Session::new(settings, embedder, model_client(config)?))
}

/// Create the model client, or `None` when the provider needs a key that
/// is not configured.
pub fn model_client(config: &AppConfig) -> AppResult<Option<Arc<dyn LlmClient>>> {
    let api_key = config.resolve_api_key();

    match create_client(
        &config.provider,
        config.provider_endpoint(),
        api_key.as_ref().map(ApiKey::expose),
        config.request_timeout(),
    ) {
        Ok(client) => Ok(Some(client)),
        Err(AppError::MissingCredential(message)) => {
            tracing::warn!(
                "{}. Set {} to enable answering.",
                message,
                config.api_key_env_name()
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Index `paths` and print a short report.
pub async fn index_files(session: &mut Session, paths: &[PathBuf]) -> AppResult<IndexReport> {
    let report = session.process_documents(paths).await?;
    print_failures(&report);
    eprintln!(
        "Indexed {} file(s): {} chunks",
        report.files.len(),
        report.chunks
    );
    Ok(report)
}

pub fn print_failures(report: &IndexReport) {
    for failure in &report.failures {
        eprintln!("  skipped {}: {}", failure.source_name, failure.message);
    }
}

pub fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        print_sources(answer);
    }
}

pub fn print_sources(answer: &Answer) {
    println!("Sources:");
    for (i, source) in answer.sources.iter().enumerate() {
        let location = match source.page {
            Some(page) => format!("{} (page {})", source.source, page),
            None => source.source.clone(),
        };
        println!("  [{}] {} score={:.3}", i + 1, location, source.score);
        println!("      {}", source.snippet.replace('\n', " "));
    }
}

/// Export successful question-paper answers. Returns the written paths.
pub fn export_if_question_paper(
    config: &AppConfig,
    answer: &Answer,
    dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    if answer.kind != RequestKind::QuestionPaper || answer.is_error() {
        return Ok(Vec::new());
    }

    let header = ExportHeader::from(&config.export);
    export_question_paper(&answer.text, &header, dir)
}
