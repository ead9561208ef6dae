//! RAG response types.

use serde::Serialize;

use crate::rag::mode::RequestKind;
use crate::vector_index::ScoredChunk;

/// Characters of chunk text shown in a source reference.
pub const SNIPPET_CHARS: usize = 300;

/// Where part of an answer's context came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub snippet: String,
    pub score: f32,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            source: scored.chunk.source_name.clone(),
            page: scored.chunk.page,
            snippet: snippet(&scored.chunk.text, SNIPPET_CHARS),
            score: scored.score,
        }
    }
}

/// Result of one `ask`.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub kind: RequestKind,
    /// Generated text, or `Error: ...` when the model call failed
    pub text: String,
    pub sources: Vec<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Answer {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// First `max_chars` characters, with `...` appended when truncated.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;

    #[test]
    fn test_snippet_truncation() {
        assert_eq!(snippet("short", 300), "short");
        assert_eq!(snippet("abcdef", 3), "abc...");
        assert_eq!(snippet("ééé", 2), "éé...");
    }

    #[test]
    fn test_source_ref_from_scored_chunk() {
        let scored = ScoredChunk {
            chunk: Chunk {
                text: "x".repeat(400),
                source_name: "os.pdf".to_string(),
                offset: 0,
                position: 0,
                page: Some(2),
            },
            score: 0.8,
            distance: 0.2,
        };

        let source = SourceRef::from(&scored);
        assert_eq!(source.source, "os.pdf");
        assert_eq!(source.page, Some(2));
        assert_eq!(source.snippet.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_answer_serialization() {
        let answer = Answer {
            kind: RequestKind::QuestionPaper,
            text: "Q1".to_string(),
            sources: Vec::new(),
            error: None,
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["kind"], "question_paper");
        assert!(json.get("error").is_none());
    }
}
