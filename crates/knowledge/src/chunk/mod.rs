//! Text chunking.
//!
//! Splits [`Document`]s into overlapping passages sized for embedding.
//! Splitting prefers paragraph breaks, then line breaks, then sentence
//! boundaries, then whitespace, and only cuts mid-word when nothing else
//! fits.

pub mod splitter;

use serde::{Deserialize, Serialize};
use studybuddy_core::config::RetrievalConfig;
use studybuddy_core::{AppError, AppResult};

use crate::loader::Document;
use splitter::RecursiveSplitter;

/// A passage of a document, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_name: String,
    /// Byte offset of the first character within the document text
    pub offset: usize,
    /// Chunk position in document (0-indexed)
    pub position: u32,
    pub page: Option<u32>,
}

/// Chunk size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be at least 1".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl From<&RetrievalConfig> for ChunkerConfig {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Chunk one document. An empty document yields no chunks.
pub fn chunk_document(document: &Document, config: &ChunkerConfig) -> AppResult<Vec<Chunk>> {
    config.validate()?;

    let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap);
    let text = &document.raw_text;

    Ok(splitter
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(position, span)| Chunk {
            text: text[span.start_byte..span.end_byte].to_string(),
            source_name: document.source_name.clone(),
            offset: span.start_byte,
            position: position as u32,
            page: document.page,
        })
        .collect())
}

/// Chunk every document, preserving document order.
pub fn chunk_documents(documents: &[Document], config: &ChunkerConfig) -> AppResult<Vec<Chunk>> {
    config.validate()?;

    let mut chunks = Vec::new();
    for document in documents {
        chunks.extend(chunk_document(document, config)?);
    }

    tracing::debug!(
        documents = documents.len(),
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Chunked documents"
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document {
            raw_text: text.to_string(),
            source_name: "os.txt".to_string(),
            page: Some(3),
        }
    }

    /// Rebuild the original text by dropping each chunk's leading overlap.
    fn reassemble(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(&chunk.text);
            } else {
                out.extend(chunk.text.chars().skip(overlap));
            }
        }
        out
    }

    fn sample_text() -> String {
        let mut text = String::new();
        for section in 0..6 {
            text.push_str(&format!("Section {} covers scheduling.\n\n", section));
            for sentence in 0..8 {
                text.push_str(&format!(
                    "Sentence {} explains how process {} waits for a lock. ",
                    sentence, section
                ));
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_short_document_yields_one_chunk() {
        let config = ChunkerConfig::default();
        let chunks = chunk_document(&doc("A deadlock is a cycle of waits."), &config).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].page, Some(3));
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let chunks = chunk_document(&doc(""), &ChunkerConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_round_trip_modulo_overlap() {
        let text = sample_text();
        let config = ChunkerConfig::new(200, 40).unwrap();
        let chunks = chunk_document(&doc(&text), &config).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks, 40), text);
    }

    #[test]
    fn test_chunk_invariants() {
        let text = sample_text();
        let config = ChunkerConfig::new(150, 30).unwrap();
        let chunks = chunk_document(&doc(&text), &config).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.text.chars().count() <= 150);
            assert_eq!(chunk.position as usize, i);
            assert_eq!(&text[chunk.offset..chunk.offset + chunk.text.len()], chunk.text);
        }

        for pair in chunks.windows(2) {
            let tail: String = {
                let chars: Vec<char> = pair[0].text.chars().collect();
                chars[chars.len() - 30..].iter().collect()
            };
            assert!(pair[1].text.starts_with(&tail));
        }
    }

    #[test]
    fn test_invalid_config() {
        assert!(ChunkerConfig::new(100, 100).is_err());
        assert!(ChunkerConfig::new(0, 0).is_err());
        assert!(ChunkerConfig::new(1, 0).is_ok());
    }

    #[test]
    fn test_documents_keep_order() {
        let docs = vec![
            Document {
                raw_text: "first".to_string(),
                source_name: "a.txt".to_string(),
                page: None,
            },
            Document {
                raw_text: "second".to_string(),
                source_name: "b.txt".to_string(),
                page: None,
            },
        ];
        let chunks = chunk_documents(&docs, &ChunkerConfig::default()).unwrap();
        let names: Vec<_> = chunks.iter().map(|c| c.source_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
