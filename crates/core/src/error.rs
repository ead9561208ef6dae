//! Error types for Study Buddy.
//!
//! One enum covers every failure category in the workspace. The four
//! user-facing kinds (document load, index build, model invocation and
//! missing credential) each get their own variant so callers can decide
//! whether a failure is per-file, per-batch or per-turn.

use thiserror::Error;

/// Unified error type for Study Buddy.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic on bad input; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single uploaded file could not be read or is unsupported.
    #[error("Failed to load '{source_name}': {message}")]
    DocumentLoad {
        source_name: String,
        message: String,
    },

    /// Embedding or index construction failed; the batch is discarded.
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// The language model call failed.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// No API key is available for a provider that needs one.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// LLM client construction errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Question paper rendering errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a document load error for the named source.
    pub fn document_load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::DocumentLoad {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
