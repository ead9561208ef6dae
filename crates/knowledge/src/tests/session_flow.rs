//! End-to-end session tests: indexing, asking and history bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use studybuddy_core::AppError;
use studybuddy_llm::{ChatMessage, ChatRole, LlmClient};
use studybuddy_prompt::PromptSet;
use tempfile::TempDir;

use super::{ScriptedLlm, SwitchableEmbedder};
use crate::chunk::ChunkerConfig;
use crate::embeddings::providers::HashedProvider;
use crate::embeddings::EmbeddingProvider;
use crate::rag::{RequestKind, Session, SessionSettings, TurnRole};

fn settings() -> SessionSettings {
    SessionSettings {
        model: "test-model".to_string(),
        temperature: 0.7,
        chunker: ChunkerConfig::new(200, 20).unwrap(),
        top_k: 4,
        history_window: 6,
        batch_size: 8,
        institution: "IIIT Sri City".to_string(),
        prompts: PromptSet::builtin().unwrap(),
    }
}

fn session_with(llm: Option<Arc<dyn LlmClient>>) -> Session {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashedProvider::new(384));
    Session::new(settings(), embedder, llm)
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn lecture_notes(dir: &Path) -> PathBuf {
    let mut text = String::new();
    for topic in [
        "Deadlock requires mutual exclusion, hold and wait, no preemption and circular wait.",
        "Paging divides memory into fixed size frames and pages.",
        "A semaphore is an integer variable used for process synchronization.",
        "Round robin scheduling gives each process a fixed time quantum.",
        "Thrashing happens when a system spends more time paging than executing.",
        "The banker's algorithm avoids deadlock by checking for safe states.",
    ] {
        text.push_str(topic);
        text.push_str("\n\n");
    }
    write_file(dir, "os_notes.txt", &text)
}

#[tokio::test]
async fn ask_without_model_client_records_nothing() {
    let mut session = session_with(None);

    let result = session.ask("What is paging?").await;

    assert!(matches!(result, Err(AppError::MissingCredential(_))));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn conversation_without_index_sends_bare_question() {
    let llm = ScriptedLlm::new(vec![Ok("Paging splits memory into pages.".to_string())]);
    let mut session = session_with(Some(llm.clone()));

    let answer = session.ask("What is paging?").await.unwrap();

    assert_eq!(answer.kind, RequestKind::Conversation);
    assert_eq!(answer.text, "Paging splits memory into pages.");
    assert!(answer.sources.is_empty());

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages, vec![ChatMessage::user("What is paging?")]);
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn indexed_conversation_uses_template_and_sources() {
    let dir = TempDir::new().unwrap();
    let notes = lecture_notes(dir.path());

    let llm = ScriptedLlm::new(vec![Ok("Circular wait is one condition.".to_string())]);
    let mut session = session_with(Some(llm.clone()));

    let report = session.process_documents(&[notes]).await.unwrap();
    assert_eq!(report.files, vec!["os_notes.txt".to_string()]);
    assert!(report.chunks > 1);
    assert_eq!(session.processed_files(), ["os_notes.txt".to_string()]);

    let answer = session.ask("What conditions cause a deadlock?").await.unwrap();

    assert!(answer.error.is_none());
    assert!(!answer.sources.is_empty() && answer.sources.len() <= 4);
    assert!(answer.sources.iter().all(|s| s.source == "os_notes.txt"));
    assert_eq!(session.last_sources().len(), answer.sources.len());

    let prompt = llm.last_prompt();
    assert!(prompt.starts_with("You are a helpful AI assistant for IIIT Sri City students."));
    assert!(prompt.contains("Deadlock requires mutual exclusion"));
    assert!(prompt.contains("Current Question: What conditions cause a deadlock?"));

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, TurnRole::User);
    assert_eq!(history[1].content, "Circular wait is one condition.");
}

#[tokio::test]
async fn model_failure_becomes_error_answer() {
    let llm = ScriptedLlm::new(vec![Err(AppError::ModelInvocation(
        "rate limited".to_string(),
    ))]);
    let mut session = session_with(Some(llm));

    let answer = session.ask("Explain thrashing").await.unwrap();

    assert!(answer.is_error());
    assert!(answer.text.starts_with("Error: "));
    assert!(answer.text.contains("rate limited"));

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, TurnRole::Assistant);
    assert_eq!(history[1].content, answer.text);
}

#[tokio::test]
async fn question_paper_without_index_uses_template() {
    let llm = ScriptedLlm::new(vec![Ok("SECTION A\n1. Define paging.".to_string())]);
    let mut session = session_with(Some(llm.clone()));

    let answer = session
        .ask("Please generate question paper on operating systems")
        .await
        .unwrap();

    assert_eq!(answer.kind, RequestKind::QuestionPaper);
    let prompt = llm.last_prompt();
    assert!(prompt.contains("User Request: Please generate question paper on operating systems"));
    assert_ne!(prompt, "Please generate question paper on operating systems");

    let requests = llm.requests();
    assert!(requests[0]
        .messages
        .iter()
        .all(|m| m.role == ChatRole::System || m.role == ChatRole::User));
}

#[tokio::test]
async fn failed_rebuild_keeps_previous_index() {
    let dir = TempDir::new().unwrap();
    let first = lecture_notes(dir.path());
    let second = write_file(dir.path(), "networks.txt", "TCP uses a three way handshake.");

    let embedder = SwitchableEmbedder::new();
    let mut session = Session::new(settings(), embedder.clone(), None);

    session.process_documents(&[first]).await.unwrap();
    let indexed = session.index_len();
    assert!(indexed > 0);

    embedder.set_failing(true);
    let result = session.process_documents(&[second.clone()]).await;

    assert!(matches!(result, Err(AppError::IndexBuild(_))));
    assert_eq!(session.index_len(), indexed);
    assert_eq!(session.processed_files(), ["os_notes.txt".to_string()]);

    embedder.set_failing(false);
    session.process_documents(&[second]).await.unwrap();
    assert_eq!(session.index_len(), 1);
    assert_eq!(session.processed_files(), ["networks.txt".to_string()]);
}

#[tokio::test]
async fn history_window_drops_oldest_turns() {
    let dir = TempDir::new().unwrap();
    let notes = lecture_notes(dir.path());

    let llm = ScriptedLlm::new(Vec::new());
    let mut session = session_with(Some(llm.clone()));
    session.process_documents(&[notes]).await.unwrap();

    for i in 0..4 {
        session.ask(&format!("question number {}", i)).await.unwrap();
    }
    session.ask("question number 4").await.unwrap();

    let prompt = llm.last_prompt();
    assert!(!prompt.contains("Human: question number 0"));
    assert!(prompt.contains("Human: question number 1"));
    assert!(prompt.contains("Human: question number 3"));
    assert_eq!(session.history().len(), 10);
}

#[tokio::test]
async fn unreadable_files_only_is_an_index_error() {
    let dir = TempDir::new().unwrap();
    let binary = dir.path().join("scan.bin");
    fs::write(&binary, [0xff_u8, 0xfe, 0x00, 0x81, 0x9f]).unwrap();

    let mut session = session_with(None);
    let result = session.process_documents(&[binary]).await;

    match result {
        Err(AppError::IndexBuild(message)) => assert!(message.contains("scan.bin")),
        other => panic!("expected IndexBuild error, got {:?}", other.map(|r| r.chunks)),
    }
    assert!(!session.has_index());
}

#[tokio::test]
async fn retrieval_failure_is_reported_in_transcript() {
    let dir = TempDir::new().unwrap();
    let notes = lecture_notes(dir.path());

    let embedder = SwitchableEmbedder::new();
    let llm = ScriptedLlm::new(Vec::new());
    let mut session = Session::new(settings(), embedder.clone(), Some(llm.clone()));
    session.process_documents(&[notes]).await.unwrap();

    embedder.set_failing(true);
    let answer = session.ask("What is a semaphore?").await.unwrap();

    assert!(answer.is_error());
    assert_eq!(answer.text, "Error: Retrieval failed: embedding service down");
    assert!(answer.sources.is_empty());
    assert!(llm.requests().is_empty());
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn reset_history_clears_turns_and_sources() {
    let llm = ScriptedLlm::new(Vec::new());
    let mut session = session_with(Some(llm));

    session.ask("hello").await.unwrap();
    assert_eq!(session.history().len(), 2);

    session.reset_history();
    assert!(session.history().is_empty());
    assert!(session.last_sources().is_empty());
}
