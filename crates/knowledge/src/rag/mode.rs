//! Request classification.

use serde::{Deserialize, Serialize};

/// Phrases that switch a request into question-paper generation.
pub const QUESTION_PAPER_KEYWORDS: [&str; 11] = [
    "generate question paper",
    "create question paper",
    "make question paper",
    "generate questions",
    "create exam",
    "make test",
    "question paper",
    "generate test",
    "create test paper",
    "quiz paper",
    "exam paper",
];

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    QuestionPaper,
    Conversation,
}

impl RequestKind {
    /// Case-insensitive substring match against [`QUESTION_PAPER_KEYWORDS`].
    pub fn classify(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();
        if QUESTION_PAPER_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Self::QuestionPaper
        } else {
            Self::Conversation
        }
    }
}

pub fn detect_question_paper_request(prompt: &str) -> bool {
    RequestKind::classify(prompt) == RequestKind::QuestionPaper
}
