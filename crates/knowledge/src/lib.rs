//! Document knowledge pipeline for Study Buddy.
//!
//! Load → chunk → embed → index at upload time; retrieve → prompt →
//! generate per question. The [`Session`] type ties the stages together
//! and owns all per-conversation state.

pub mod chunk;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod rag;
pub mod retriever;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::{chunk_document, chunk_documents, Chunk, ChunkerConfig};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::{build_index, MemoryIndex};
pub use loader::{load_file, load_paths, Document, LoadFailure, LoadReport};
pub use rag::{
    detect_question_paper_request, Answer, ConversationTurn, IndexReport, RequestKind, Session,
    SessionSettings, SourceRef, TurnRole,
};
pub use retriever::Retriever;
pub use vector_index::{ScoredChunk, VectorIndex};
